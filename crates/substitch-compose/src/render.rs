// crates/substitch-compose/src/render.rs
//
// Raster assembly: paint the planned stack onto a white canvas. The layout
// decides every rectangle; this stage only moves pixels.

use image::{imageops, Rgba, RgbaImage};
use substitch_core::layout::StackLayout;

const CANVAS_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Draw the captures onto a canvas according to `layout`.
///
/// `images` must be index-aligned with `layout.segments` (both come from
/// the same ordered sequence). The canvas is filled solid white first so
/// captures narrower than the canvas, and any transparency in the sources,
/// sit on white rather than on garbage. Each segment is alpha-composited
/// at its natural width, left-aligned, top to bottom.
pub fn render_stack(layout: &StackLayout, images: &[RgbaImage]) -> RgbaImage {
    debug_assert_eq!(images.len(), layout.segments.len());

    let mut canvas = RgbaImage::from_pixel(
        layout.width.max(1),
        layout.height.max(1),
        CANVAS_WHITE,
    );

    for (img, seg) in images.iter().zip(&layout.segments) {
        if seg.src_h == 0 {
            continue;
        }
        let band = imageops::crop_imm(img, 0, seg.src_y, img.width(), seg.src_h);
        imageops::overlay(&mut canvas, &*band, 0, i64::from(seg.dst_y));
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    const RED:   [u8; 4] = [200, 0, 0, 255];
    const BLUE:  [u8; 4] = [0, 0, 200, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn first_capture_drawn_full_then_bottom_bands() {
        // A 8x10 red, B 6x5 blue, spacing 1, ratio 0.2:
        // canvas 8x12, rows 0..10 red (white gutter right of B only),
        // row 10 spacing (white), row 11 the one-row blue band.
        let a = solid(8, 10, RED);
        let b = solid(6, 5, BLUE);
        let layout = StackLayout::plan(&[(8, 10), (6, 5)], 1, 0.2).unwrap();
        let out = render_stack(&layout, &[a, b]);

        assert_eq!(out.dimensions(), (8, 12));
        assert_eq!(out.get_pixel(0, 0).0, RED);
        assert_eq!(out.get_pixel(7, 9).0, RED);
        assert_eq!(out.get_pixel(3, 10).0, WHITE, "spacing row stays white");
        assert_eq!(out.get_pixel(0, 11).0, BLUE);
        assert_eq!(out.get_pixel(5, 11).0, BLUE);
        assert_eq!(out.get_pixel(6, 11).0, WHITE, "narrow capture leaves white gutter");
    }

    #[test]
    fn band_is_cropped_from_the_bottom_of_the_source() {
        // Top half green, bottom half blue; ratio 0.5 must show only blue.
        let mut src = solid(4, 8, [0, 200, 0, 255]);
        for y in 4..8 {
            for x in 0..4 {
                src.put_pixel(x, y, Rgba(BLUE));
            }
        }
        let first = solid(4, 2, RED);
        let layout = StackLayout::plan(&[(4, 2), (4, 8)], 0, 0.5).unwrap();
        let out = render_stack(&layout, &[first, src]);

        assert_eq!(out.dimensions(), (4, 6));
        for y in 2..6 {
            assert_eq!(out.get_pixel(1, y).0, BLUE, "row {y} must come from the bottom half");
        }
    }

    #[test]
    fn transparent_pixels_composite_onto_white() {
        let clear = solid(2, 2, [0, 0, 0, 0]);
        let layout = StackLayout::plan(&[(2, 2)], 0, 1.0).unwrap();
        let out = render_stack(&layout, &[clear]);
        assert_eq!(out.get_pixel(0, 0).0, WHITE);
        assert_eq!(out.get_pixel(1, 1).0, WHITE);
    }

    #[test]
    fn zero_row_band_contributes_nothing() {
        let a = solid(3, 3, RED);
        let tiny = solid(3, 5, BLUE);
        // floor(5 * 0.10) = 0 rows from the second capture.
        let layout = StackLayout::plan(&[(3, 3), (3, 5)], 2, 0.10).unwrap();
        let out = render_stack(&layout, &[a, tiny]);
        assert_eq!(out.dimensions(), (3, 5));
        assert_eq!(out.get_pixel(1, 3).0, WHITE);
        assert_eq!(out.get_pixel(1, 4).0, WHITE);
    }
}
