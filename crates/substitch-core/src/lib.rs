// crates/substitch-core/src/lib.rs
//
// Pure data and algorithms for SubStitch: the ordered capture sequence,
// the command vocabulary, gesture resolution, and stack-layout math.
// No egui, no image decoding, no threads. Everything in this crate is
// deterministic and testable without a rendering surface.

pub mod artifacts;
pub mod commands;
pub mod layout;
pub mod reorder;
pub mod state;
