// crates/substitch-core/src/layout.rs
//
// Stack-layout math for the compositor: given the natural sizes of the
// ordered captures plus the two parameters, compute where every segment
// comes from in its source and where it lands on the canvas. Pure
// arithmetic; the render stage in substitch-compose consumes the plan.

/// One vertical slice of the composed output.
///
/// Index-aligned with the input sizes: segment i reads rows
/// `src_y .. src_y + src_h` of capture i and lands at `dst_y` on the
/// canvas, drawn at the capture's natural width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub src_y: u32,
    pub src_h: u32,
    pub dst_y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLayout {
    /// Max natural width across all captures.
    pub width:  u32,
    /// Sum of segment heights plus spacing between segments (none trailing).
    pub height: u32,
    pub segments: Vec<Segment>,
}

impl StackLayout {
    /// Plan the stack for `sizes` (natural `(width, height)` per capture, in
    /// sequence order). Returns None for an empty sequence: there is nothing
    /// to compose and no canvas should be allocated.
    ///
    /// Segment heights: position 0 keeps its full natural height; every
    /// later capture contributes `floor(height * subtitle_ratio)` rows taken
    /// from the bottom of the image. The ratio is clamped to (0, 1] so a
    /// band can never exceed its source.
    pub fn plan(sizes: &[(u32, u32)], spacing: u32, subtitle_ratio: f32) -> Option<Self> {
        if sizes.is_empty() {
            return None;
        }
        let ratio = subtitle_ratio.clamp(f32::EPSILON, 1.0);

        let width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);

        let mut segments = Vec::with_capacity(sizes.len());
        let mut dst_y = 0u32;
        for (i, &(_, h)) in sizes.iter().enumerate() {
            let src_h = if i == 0 {
                h
            } else {
                ((h as f64) * (ratio as f64)).floor() as u32
            };
            let src_y = h - src_h;
            if i > 0 {
                dst_y += spacing;
            }
            segments.push(Segment { src_y, src_h, dst_y });
            dst_y += src_h;
        }

        Some(Self { width, height: dst_y, segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_has_no_layout() {
        assert_eq!(StackLayout::plan(&[], 10, 0.15), None);
    }

    #[test]
    fn single_capture_is_drawn_in_full() {
        let layout = StackLayout::plan(&[(800, 600)], 25, 0.15).unwrap();
        assert_eq!(layout.width, 800);
        assert_eq!(layout.height, 600);
        assert_eq!(layout.segments, vec![Segment { src_y: 0, src_h: 600, dst_y: 0 }]);
    }

    #[test]
    fn two_capture_scenario_matches_hand_computation() {
        // A(800x1000) full, B(600x500) banded at 0.20 with spacing 10:
        // width = 800, height = 1000 + 10 + floor(500*0.20) = 1110,
        // B reads rows 400..500 of its source.
        let layout = StackLayout::plan(&[(800, 1000), (600, 500)], 10, 0.20).unwrap();
        assert_eq!(layout.width, 800);
        assert_eq!(layout.height, 1110);
        assert_eq!(layout.segments[0], Segment { src_y: 0, src_h: 1000, dst_y: 0 });
        assert_eq!(layout.segments[1], Segment { src_y: 400, src_h: 100, dst_y: 1010 });
    }

    #[test]
    fn height_is_sum_of_segments_plus_inner_spacing() {
        let sizes = [(400, 300), (400, 200), (400, 250)];
        let spacing = 7;
        let ratio = 0.33;
        let layout = StackLayout::plan(&sizes, spacing, ratio).unwrap();
        let expected: u32 = 300
            + ((200.0 * 0.33) as f64).floor() as u32
            + ((250.0 * 0.33) as f64).floor() as u32
            + spacing * 2;
        assert_eq!(layout.height, expected);
    }

    #[test]
    fn band_height_is_floored_and_never_exceeds_source() {
        let layout = StackLayout::plan(&[(100, 100), (100, 333)], 0, 0.15).unwrap();
        // floor(333 * 0.15) = floor(49.95) = 49
        assert_eq!(layout.segments[1].src_h, 49);
        assert_eq!(layout.segments[1].src_y, 333 - 49);

        let full = StackLayout::plan(&[(100, 100), (100, 333)], 0, 1.0).unwrap();
        assert_eq!(full.segments[1].src_h, 333);
        assert_eq!(full.segments[1].src_y, 0);
    }

    #[test]
    fn no_trailing_spacing_after_last_segment() {
        let layout = StackLayout::plan(&[(10, 10), (10, 10)], 50, 1.0).unwrap();
        assert_eq!(layout.height, 10 + 50 + 10);
        assert_eq!(layout.segments[1].dst_y, 60);
    }

    #[test]
    fn tiny_band_can_floor_to_zero_rows() {
        // floor(5 * 0.10) = 0: the capture contributes nothing but stays in
        // the sequence, and the spacing around it is still honored.
        let layout = StackLayout::plan(&[(10, 10), (10, 5)], 4, 0.10).unwrap();
        assert_eq!(layout.segments[1].src_h, 0);
        assert_eq!(layout.height, 10 + 4);
    }
}
