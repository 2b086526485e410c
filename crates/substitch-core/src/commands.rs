// crates/substitch-core/src/commands.rs
//
// Every user action in SubStitch is expressed as a SequenceCommand.
// Modules emit these; app.rs processes them after the UI pass.
// Adding a new feature = add a variant here + one match arm in app.rs.

use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum SequenceCommand {
    // ── Captures ─────────────────────────────────────────────────────────────
    /// Read the given files and append them as one batch, preserving the
    /// picker/drop order. Files that cannot be read are logged and skipped.
    ImportFiles(Vec<PathBuf>),
    /// Resolved reorder: remove at `from`, reinsert at `to` in the
    /// post-removal sequence. Exactly one per completed gesture.
    MoveEntry { from: usize, to: usize },
    RemoveEntry(usize),
    SelectEntry(Option<Uuid>),

    // ── Overlay ──────────────────────────────────────────────────────────────
    OpenLightbox(Uuid),
    CloseLightbox,

    // ── Parameters ───────────────────────────────────────────────────────────
    SetSpacing(u32),
    SetSubtitleRatio(f32),

    // ── Composition ──────────────────────────────────────────────────────────
    /// Explicit preview request (the Compose button). Also issued by the
    /// reducer itself to resync an active preview after a sequence mutation.
    RequestCompose,
    /// Export the most recent composed image. app.rs opens the save dialog
    /// and hands the PNG bytes to the worker.
    SaveComposed,
    DismissComposeError,
    ClearSaveStatus,
}
