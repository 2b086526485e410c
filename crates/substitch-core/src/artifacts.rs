// crates/substitch-core/src/artifacts.rs
//
// Result types produced by the compose worker and consumed by the UI.
// Kept here (not in substitch-compose) so the core stays the single home
// for every type that crosses the worker channel, mirroring how the state
// and command vocabulary live together.

use std::path::PathBuf;
use uuid::Uuid;

/// Everything the compose worker can send back over its result channel.
#[derive(Debug, Clone)]
pub enum ComposeResult {
    /// Async probe of one capture: natural size plus a strip thumbnail.
    SourcePixels {
        id:           Uuid,
        width:        u32,
        height:       u32,
        thumb_width:  u32,
        thumb_height: u32,
        thumb_rgba:   Vec<u8>,
    },
    /// The probe could not decode the capture's bytes.
    ProbeFailed { id: Uuid, msg: String },

    /// One-shot full-resolution decode, requested when a capture is
    /// enlarged in the lightbox overlay.
    FullPixels {
        id:     Uuid,
        width:  u32,
        height: u32,
        rgba:   Vec<u8>,
    },

    /// A finished composition. `job_id` is the version stamp: the UI applies
    /// the result only when it matches `SequenceState::compose_job`, so a
    /// slow render superseded by a newer request is discarded, not shown.
    Composed {
        job_id: Uuid,
        width:  u32,
        height: u32,
        /// Unpremultiplied RGBA for the preview texture.
        rgba: Vec<u8>,
        /// Lossless encoding of the same pixels, reused verbatim for export.
        png: Vec<u8>,
    },
    /// Composition abandoned: a capture failed to decode (named), or the
    /// job was cancelled by a superseding request.
    ComposeFailed {
        job_id:     Uuid,
        entry_name: String,
        msg:        String,
    },

    /// Export results.
    Saved { path: PathBuf },
    SaveFailed { msg: String },
}
