// crates/substitch-ui/src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing SequencePanel
//   2. Add `pub mod mypanel;` below
//   3. Give it a panel in app.rs::update

pub mod compose_panel;
pub mod preview;
pub mod strip;

use std::collections::HashMap;

use egui::{TextureHandle, Ui};
use uuid::Uuid;

use substitch_core::commands::SequenceCommand;
use substitch_core::state::SequenceState;

use crate::context::TextureCaches;

/// GPU-resident strip thumbnails: entry id -> loaded texture
pub type ThumbnailCache = HashMap<Uuid, TextureHandle>;

/// Every panel implements this trait.
/// Panels read state, emit commands; they never mutate state directly.
pub trait SequencePanel {
    fn name(&self) -> &str;
    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &SequenceState,
        cache: &mut TextureCaches,
        cmd:   &mut Vec<SequenceCommand>,
    );
}
