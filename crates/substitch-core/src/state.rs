// crates/substitch-core/src/state.rs
// Pure sequence data: no egui, no decoding, no runtime handles.
// Serializable via serde (source bytes and runtime fields are skipped).
// Used by both substitch-ui and substitch-compose consumers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ── Parameter defaults and ranges ─────────────────────────────────────────────

/// Pixels inserted between stacked segments. Slider range is 0..=SPACING_MAX.
pub const DEFAULT_SPACING: u32 = 0;
pub const SPACING_MAX: u32 = 100;

/// Fraction of each non-first capture's height treated as the subtitle band,
/// measured from the bottom. Slider range is RATIO_MIN..=RATIO_MAX.
pub const DEFAULT_SUBTITLE_RATIO: f32 = 0.15;
pub const RATIO_MIN: f32 = 0.10;
pub const RATIO_MAX: f32 = 1.00;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

// ── Source bytes ──────────────────────────────────────────────────────────────

/// Refcounted handle to the raw encoded bytes of one capture.
///
/// The sequence owns one strong reference per entry; compose and probe jobs
/// clone the handle for the duration of their work. Removing an entry drops
/// the sequence's reference, so the allocation is released as soon as the
/// last in-flight job finishes with it.
#[derive(Clone, Debug, Default)]
pub struct SourceBytes(Arc<Vec<u8>>);

impl SourceBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A capture handed to `append_batch` by the adapter layer (file picker or
/// OS drop). The core never touches the filesystem itself.
#[derive(Clone, Debug)]
pub struct NewCapture {
    pub name:  String,
    pub bytes: Vec<u8>,
}

// ── Entries ───────────────────────────────────────────────────────────────────

/// One capture in the sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id:   Uuid,
    pub name: String,
    /// Monotonic tag assigned at append time. Disambiguates the ordering of
    /// a multi-file batch at initial placement and is never consulted again.
    pub insertion_tag: u64,
    #[serde(skip)]
    pub source: SourceBytes,
    /// Natural pixel dimensions, filled in by the async probe. None until
    /// the probe result arrives.
    #[serde(skip)]
    pub natural_size: Option<(u32, u32)>,
    /// Set when the probe could not decode the bytes. The entry stays in
    /// the sequence (compose will fail fast and name it) but the strip
    /// shows a warning badge instead of a thumbnail.
    #[serde(skip)]
    pub probe_failed: bool,
}

// ── Sequence state ────────────────────────────────────────────────────────────

/// The whole application state: the ordered capture sequence, the two
/// composition parameters, and the runtime fields that track the preview
/// pipeline. Mutated only through its methods, which the app's command
/// reducer calls; UI modules read it and emit commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceState {
    /// Dense, order defines stacking order in the composed output.
    pub entries: Vec<ImageEntry>,
    /// Pixels between stacked segments.
    pub spacing: u32,
    /// Bottom fraction of each non-first capture kept in the output.
    pub subtitle_ratio: f32,

    pub selected: Option<Uuid>,
    /// Entry shown enlarged in the overlay, if any.
    #[serde(skip)]
    pub lightbox: Option<Uuid>,

    /// True while a composed preview is on screen. Mutations of the
    /// sequence while this is set must trigger exactly one re-compose.
    #[serde(skip)]
    pub preview_shown: bool,
    /// Id of the most recently issued compose call. Results stamped with
    /// any other id are stale and must be discarded, never applied.
    #[serde(skip)]
    pub compose_job: Option<Uuid>,
    /// Last compose failure, shown as a banner until dismissed.
    #[serde(skip)]
    pub compose_error: Option<String>,
    /// Transient confirmation after a successful export.
    #[serde(skip)]
    pub save_status: Option<String>,

    next_insertion_tag: u64,
}

impl Default for SequenceState {
    fn default() -> Self {
        Self {
            entries:            Vec::new(),
            spacing:            DEFAULT_SPACING,
            subtitle_ratio:     DEFAULT_SUBTITLE_RATIO,
            selected:           None,
            lightbox:           None,
            preview_shown:      false,
            compose_job:        None,
            compose_error:      None,
            save_status:        None,
            next_insertion_tag: 0,
        }
    }
}

impl SequenceState {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_index(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn entry(&self, id: Uuid) -> Option<&ImageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Append a batch of captures after any existing entries, preserving the
    /// batch-internal order. Each entry gets a fresh id and an increasing
    /// insertion tag. Returns the new ids so the caller can kick off probes.
    ///
    /// Never fails: malformed bytes are accepted here and surface later,
    /// either as a probe badge or as a named decode error at compose time.
    pub fn append_batch(&mut self, batch: Vec<NewCapture>) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(batch.len());
        for capture in batch {
            let id  = Uuid::new_v4();
            let tag = self.next_insertion_tag;
            self.next_insertion_tag += 1;
            self.entries.push(ImageEntry {
                id,
                name:          capture.name,
                insertion_tag: tag,
                source:        SourceBytes::new(capture.bytes),
                natural_size:  None,
                probe_failed:  false,
            });
            ids.push(id);
        }
        ids
    }

    /// Remove the entry at `from` and reinsert it at `to` in the
    /// post-removal sequence. Returns `Ok(true)` when the order actually
    /// changed, `Ok(false)` for the `from == to` no-op, and leaves the
    /// sequence untouched on a bad index.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<bool, SequenceError> {
        let len = self.entries.len();
        if from >= len {
            return Err(SequenceError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(SequenceError::IndexOutOfRange { index: to, len });
        }
        if from == to {
            return Ok(false);
        }
        // Vec::remove then insert keeps the sequence dense; both halves
        // happen inside one &mut call so no observer sees the gap.
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(true)
    }

    /// Remove and return the entry at `index`. The returned entry carries
    /// the sequence's strong reference to its source bytes; dropping it is
    /// the release. Removing the last entry clears the active preview:
    /// there is nothing left to show, and the caller drops the composed
    /// artifact alongside.
    pub fn remove_entry(&mut self, index: usize) -> Result<ImageEntry, SequenceError> {
        let len = self.entries.len();
        if index >= len {
            return Err(SequenceError::IndexOutOfRange { index, len });
        }
        let entry = self.entries.remove(index);
        if self.selected == Some(entry.id) {
            self.selected = None;
        }
        if self.lightbox == Some(entry.id) {
            self.lightbox = None;
        }
        if self.entries.is_empty() {
            self.preview_shown = false;
            self.compose_job   = None;
        }
        Ok(entry)
    }

    /// Record a probe result for `id`. A stale result for an entry that has
    /// since been removed is silently ignored.
    pub fn set_natural_size(&mut self, id: Uuid, width: u32, height: u32) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.natural_size = Some((width, height));
        }
    }

    pub fn mark_probe_failed(&mut self, id: Uuid) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.probe_failed = true;
        }
    }

    pub fn set_spacing(&mut self, spacing: u32) {
        self.spacing = spacing.min(SPACING_MAX);
    }

    pub fn set_subtitle_ratio(&mut self, ratio: f32) {
        self.subtitle_ratio = ratio.clamp(RATIO_MIN, RATIO_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(name: &str) -> NewCapture {
        NewCapture { name: name.into(), bytes: vec![0u8; 4] }
    }

    fn names(state: &SequenceState) -> Vec<&str> {
        state.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn append_preserves_batch_order_after_existing() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b")]);
        s.append_batch(vec![capture("c"), capture("d")]);
        assert_eq!(names(&s), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn insertion_tags_are_monotonic_across_batches() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b")]);
        s.append_batch(vec![capture("c")]);
        let tags: Vec<u64> = s.entries.iter().map(|e| e.insertion_tag).collect();
        assert_eq!(tags, vec![0, 1, 2]);
    }

    #[test]
    fn move_same_index_is_noop() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b"), capture("c")]);
        let before = names(&s)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert_eq!(s.move_entry(1, 1), Ok(false));
        assert_eq!(names(&s), before);
    }

    #[test]
    fn move_round_trip_restores_order() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b"), capture("c"), capture("d")]);
        assert_eq!(s.move_entry(0, 2), Ok(true));
        assert_eq!(names(&s), vec!["b", "c", "a", "d"]);
        assert_eq!(s.move_entry(2, 0), Ok(true));
        assert_eq!(names(&s), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn move_rejects_bad_indices_and_leaves_state_unchanged() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b")]);
        assert_eq!(
            s.move_entry(2, 0),
            Err(SequenceError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            s.move_entry(0, 5),
            Err(SequenceError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(names(&s), vec!["a", "b"]);
    }

    #[test]
    fn remove_returns_entry_and_clears_selection() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b")]);
        let id = s.entries[0].id;
        s.selected = Some(id);
        let removed = s.remove_entry(0).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(s.selected, None);
        assert_eq!(names(&s), vec!["b"]);
    }

    #[test]
    fn remove_rejects_bad_index() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a")]);
        let err = s.remove_entry(1).unwrap_err();
        assert_eq!(err, SequenceError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn dragging_last_entry_to_front_yields_expected_order() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("e0"), capture("e1"), capture("e2")]);
        s.move_entry(2, 0).unwrap();
        assert_eq!(names(&s), vec!["e2", "e0", "e1"]);
    }

    #[test]
    fn removing_the_last_entry_clears_the_active_preview() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b")]);
        s.preview_shown = true;
        s.compose_job   = Some(Uuid::new_v4());

        s.remove_entry(1).unwrap();
        assert!(s.preview_shown, "a non-empty sequence keeps its preview");

        s.remove_entry(0).unwrap();
        assert!(!s.preview_shown);
        assert_eq!(s.compose_job, None);
    }

    #[test]
    fn source_bytes_shared_until_last_handle_drops() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a")]);
        let job_handle = s.entries[0].source.clone();
        let removed = s.remove_entry(0).unwrap();
        drop(removed);
        // The in-flight job still reads valid bytes after removal.
        assert_eq!(job_handle.len(), 4);
    }

    #[test]
    fn parameter_setters_clamp_to_ranges() {
        let mut s = SequenceState::default();
        s.set_spacing(250);
        assert_eq!(s.spacing, SPACING_MAX);
        s.set_subtitle_ratio(0.02);
        assert_eq!(s.subtitle_ratio, RATIO_MIN);
        s.set_subtitle_ratio(1.7);
        assert_eq!(s.subtitle_ratio, RATIO_MAX);
    }

    #[test]
    fn serialized_state_round_trips_parameters_and_order() {
        let mut s = SequenceState::default();
        s.append_batch(vec![capture("a"), capture("b")]);
        s.set_spacing(12);
        s.set_subtitle_ratio(0.25);
        let json = serde_json::to_string(&s).unwrap();
        let back: SequenceState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.spacing, 12);
        assert!((back.subtitle_ratio - 0.25).abs() < f32::EPSILON);
        let restored: Vec<&str> = back.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(restored, vec!["a", "b"]);
    }
}
