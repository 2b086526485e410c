// crates/substitch-core/src/reorder.rs
//
// Gesture resolution: map a completed drag gesture to a single move of the
// capture sequence. Pure index math; the UI layer measures geometry (card
// rects, row midpoints, item heights) and calls in with numbers. Keeping
// the geometry out of here is what makes every rule below unit-testable.

/// A resolved reorder: remove at `from`, reinsert at `to` in the
/// post-removal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: usize,
    pub to:   usize,
}

/// Pointer-drag rule: the origin index is captured at gesture start, the
/// target is the index of the card under the pointer at release.
/// Dropping a card onto itself is a no-op.
pub fn pointer_drop(origin: usize, target: usize) -> Option<MoveRequest> {
    if origin == target {
        return None;
    }
    Some(MoveRequest { from: origin, to: target })
}

/// Touch-drag rule: only vertical displacement is tracked during the
/// gesture; at release the new index is
/// `origin + round(delta_y / avg_item_height)`, clamped to the sequence.
/// Returns None when the sequence is empty, the measured height is
/// unusable, or the index did not change.
pub fn touch_drop(
    origin:          usize,
    delta_y:         f32,
    avg_item_height: f32,
    len:             usize,
) -> Option<MoveRequest> {
    if len == 0 || origin >= len || !(avg_item_height > 0.0) {
        return None;
    }
    let shift  = (delta_y / avg_item_height).round() as i64;
    let target = (origin as i64 + shift).clamp(0, len as i64 - 1) as usize;
    if target == origin {
        return None;
    }
    Some(MoveRequest { from: origin, to: target })
}

/// Insert-before rule for the preview list: given the vertical midpoints of
/// the unmoved rows in display order, the drop position is the first row
/// whose midpoint lies below the pointer. A pointer below every midpoint
/// inserts at the end.
///
/// The midpoints exclude the dragged row, so the returned index is already
/// in post-removal coordinates and can be passed straight to `MoveEntry`.
pub fn insert_index(pointer_y: f32, unmoved_midpoints: &[f32]) -> usize {
    unmoved_midpoints
        .iter()
        .position(|&mid| pointer_y < mid)
        .unwrap_or(unmoved_midpoints.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_drop_onto_self_is_noop() {
        assert_eq!(pointer_drop(2, 2), None);
    }

    #[test]
    fn pointer_drop_resolves_to_target_index() {
        // Dragging the card at index 2 onto index 0 yields [e2, e0, e1]
        // once the sequence applies remove(2) + insert(0).
        assert_eq!(pointer_drop(2, 0), Some(MoveRequest { from: 2, to: 0 }));
    }

    #[test]
    fn touch_drop_rounds_displacement_to_rows() {
        // 1.4 rows down rounds to 1.
        assert_eq!(
            touch_drop(1, 70.0, 50.0, 4),
            Some(MoveRequest { from: 1, to: 2 })
        );
        // 1.6 rows down rounds to 2.
        assert_eq!(
            touch_drop(1, 80.0, 50.0, 4),
            Some(MoveRequest { from: 1, to: 3 })
        );
    }

    #[test]
    fn touch_drop_clamps_to_sequence_bounds() {
        assert_eq!(
            touch_drop(0, -400.0, 50.0, 3),
            None,
            "upward drag from the first row clamps back to 0, a no-op"
        );
        assert_eq!(
            touch_drop(0, 400.0, 50.0, 3),
            Some(MoveRequest { from: 0, to: 2 })
        );
    }

    #[test]
    fn touch_drop_small_displacement_is_noop() {
        assert_eq!(touch_drop(1, 20.0, 50.0, 4), None);
    }

    #[test]
    fn touch_drop_guards_degenerate_input() {
        assert_eq!(touch_drop(0, 50.0, 50.0, 0), None);
        assert_eq!(touch_drop(5, 50.0, 50.0, 3), None);
        assert_eq!(touch_drop(0, 50.0, 0.0, 3), None);
        assert_eq!(touch_drop(0, 50.0, f32::NAN, 3), None);
    }

    #[test]
    fn insert_index_picks_first_midpoint_below_pointer() {
        let mids = [25.0, 75.0, 125.0];
        assert_eq!(insert_index(10.0, &mids), 0);
        assert_eq!(insert_index(50.0, &mids), 1);
        assert_eq!(insert_index(100.0, &mids), 2);
    }

    #[test]
    fn insert_index_past_all_rows_appends() {
        let mids = [25.0, 75.0];
        assert_eq!(insert_index(300.0, &mids), 2);
        assert_eq!(insert_index(0.0, &[]), 0);
    }

    #[test]
    fn insert_index_interpolates_between_rows() {
        // A pointer between two row midpoints resolves to the boundary
        // between them, not to a fixed per-row drop zone.
        let mids = [30.0, 90.0];
        assert_eq!(insert_index(59.9, &mids), 1);
        assert_eq!(insert_index(29.9, &mids), 0);
    }
}
