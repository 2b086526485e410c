// crates/substitch-compose/src/lib.rs
//
// The compositor pipeline: background decode, stack rendering, PNG
// encoding, and the worker that ties them together behind channels.
// substitch-ui only ever talks to `ComposeWorker`; the stage functions are
// public for tests and for any future headless consumer.

pub mod decode;
pub mod encode;
pub mod render;
pub mod worker;

pub use worker::{ComposeEntry, ComposeJob, ComposeWorker};

use thiserror::Error;

/// Terminal failure of one compose call. No retries: the user re-triggers.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A capture's bytes could not be decoded. Carries the entry name so
    /// the UI can point at the offending capture instead of stalling.
    #[error("could not decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    /// The job was superseded by a newer request before it finished.
    #[error("superseded by a newer compose request")]
    Cancelled,
    /// PNG serialization of the finished canvas failed.
    #[error("could not encode the composed image: {msg}")]
    Encode { msg: String },
}
