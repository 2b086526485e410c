// crates/substitch-ui/src/context.rs
//
// AppContext owns all runtime handles that are NOT part of the sequence
// state: the compose worker and the GPU texture caches. SubStitchApp holds
// one of these plus a SequenceState and the panel list, nothing else.
//
// Sub-struct layout:
//   AppContext
//     +-- worker: ComposeWorker      (compose/probe/save threads + channel)
//     +-- textures: TextureCaches    (strip thumbnails, composed preview,
//                                     lightbox full-resolution texture)

use std::sync::Arc;

use eframe::egui;
use uuid::Uuid;

use substitch_core::artifacts::ComposeResult;
use substitch_core::state::SequenceState;
use substitch_compose::ComposeWorker;

use crate::modules::ThumbnailCache;
use crate::substitch_log;

// ── Texture caches ────────────────────────────────────────────────────────────

/// The composed preview artifact: the texture that is drawn on screen and
/// the PNG bytes that back the Download button. Both come from the same
/// compose call, so what the user exports is exactly what they see.
pub struct ComposedPreview {
    pub texture: egui::TextureHandle,
    pub width:   u32,
    pub height:  u32,
    pub png:     Arc<Vec<u8>>,
}

/// Everything GPU-resident, handed to panels alongside the state.
/// Dropping a TextureHandle releases its GPU allocation, so eviction is
/// just removal.
pub struct TextureCaches {
    /// Strip thumbnails (capture card images), keyed by entry id.
    pub thumbs: ThumbnailCache,
    /// The current composed preview, None until the first compose and
    /// after the sequence empties.
    pub composed: Option<ComposedPreview>,
    /// Full-resolution texture for the lightbox overlay, loaded on demand
    /// when a capture is enlarged and dropped when the overlay closes.
    pub lightbox_full: Option<(Uuid, egui::TextureHandle)>,
}

impl TextureCaches {
    fn new() -> Self {
        Self {
            thumbs:        ThumbnailCache::new(),
            composed:      None,
            lightbox_full: None,
        }
    }
}

// ── AppContext ────────────────────────────────────────────────────────────────

pub struct AppContext {
    pub worker:   ComposeWorker,
    pub textures: TextureCaches,
}

impl AppContext {
    pub fn new(worker: ComposeWorker) -> Self {
        Self {
            worker,
            textures: TextureCaches::new(),
        }
    }

    /// Drain the worker result channel and load everything into the
    /// appropriate cache or state field. Called once per frame from
    /// `app::update`, before the panels run.
    ///
    /// This is the single translation layer between raw worker output and
    /// UI-visible state. Compose results are applied only when their
    /// job_id matches `state.compose_job`; anything else was superseded by
    /// a newer request and is dropped here, never shown.
    pub fn ingest_worker_results(
        &mut self,
        state: &mut SequenceState,
        ctx:   &egui::Context,
    ) {
        while let Ok(result) = self.worker.rx.try_recv() {
            match result {
                ComposeResult::SourcePixels {
                    id,
                    width,
                    height,
                    thumb_width,
                    thumb_height,
                    thumb_rgba,
                } => {
                    // Probe of a capture that was removed in the meantime:
                    // the state setter ignores it and no texture is kept.
                    if state.entry(id).is_none() {
                        continue;
                    }
                    state.set_natural_size(id, width, height);
                    let tex = ctx.load_texture(
                        format!("thumb-{id}"),
                        egui::ColorImage::from_rgba_unmultiplied(
                            [thumb_width as usize, thumb_height as usize],
                            &thumb_rgba,
                        ),
                        egui::TextureOptions::LINEAR,
                    );
                    self.textures.thumbs.insert(id, tex);
                    ctx.request_repaint();
                }

                ComposeResult::ProbeFailed { id, msg } => {
                    eprintln!("[probe] {id}: {msg}");
                    state.mark_probe_failed(id);
                    ctx.request_repaint();
                }

                ComposeResult::FullPixels { id, width, height, rgba } => {
                    // The overlay may have been closed (or moved to another
                    // capture) while the decode ran; keep only a match.
                    if state.lightbox != Some(id) {
                        continue;
                    }
                    let tex = ctx.load_texture(
                        format!("full-{id}"),
                        egui::ColorImage::from_rgba_unmultiplied(
                            [width as usize, height as usize],
                            &rgba,
                        ),
                        egui::TextureOptions::LINEAR,
                    );
                    self.textures.lightbox_full = Some((id, tex));
                    ctx.request_repaint();
                }

                ComposeResult::Composed { job_id, width, height, rgba, png } => {
                    if state.compose_job != Some(job_id) {
                        eprintln!("[compose] stale result {job_id} discarded");
                        continue;
                    }
                    state.compose_job   = None;
                    state.compose_error = None;
                    state.preview_shown = true;
                    let tex = ctx.load_texture(
                        "composed-preview",
                        egui::ColorImage::from_rgba_unmultiplied(
                            [width as usize, height as usize],
                            &rgba,
                        ),
                        egui::TextureOptions::LINEAR,
                    );
                    self.textures.composed = Some(ComposedPreview {
                        texture: tex,
                        width,
                        height,
                        png: Arc::new(png),
                    });
                    ctx.request_repaint();
                }

                ComposeResult::ComposeFailed { job_id, entry_name, msg } => {
                    if state.compose_job != Some(job_id) {
                        continue;
                    }
                    state.compose_job = None;
                    // The previously displayed composed image stays intact;
                    // only the in-flight call is abandoned.
                    state.compose_error = Some(if entry_name.is_empty() {
                        msg
                    } else {
                        format!("{entry_name}: {msg}")
                    });
                    ctx.request_repaint();
                }

                ComposeResult::Saved { path } => {
                    substitch_log!("[save] composed PNG -> {}", path.display());
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "file".into());
                    state.save_status = Some(format!("Saved: {name}"));
                    ctx.request_repaint();
                }

                ComposeResult::SaveFailed { msg } => {
                    substitch_log!("[save] failed: {msg}");
                    state.save_status = Some(format!("Save failed: {msg}"));
                    ctx.request_repaint();
                }
            }
        }
    }
}
