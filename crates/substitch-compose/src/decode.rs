// crates/substitch-compose/src/decode.rs
//
// Image decoding for the compose pipeline and the strip-thumbnail probe.
// Everything decodes from in-memory bytes: the sequence owns the file
// contents, so nothing here touches the filesystem.

use std::sync::atomic::{AtomicBool, Ordering};

use image::{GenericImageView, RgbaImage};
use rayon::prelude::*;

use crate::worker::ComposeEntry;
use crate::ComposeError;

/// Width of strip thumbnails. Height follows the source aspect ratio.
pub const THUMB_WIDTH: u32 = 192;

/// Decode one capture to straight-alpha RGBA.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    image::load_from_memory(bytes).map(|img| img.to_rgba8())
}

/// Decode every capture of a compose job concurrently.
///
/// All entries decode in parallel and the whole batch settles before the
/// caller measures anything. The collect short-circuits on the first
/// failure, which names the offending entry; a set cancel flag aborts
/// un-started entries so a superseded job stops burning cores.
pub fn decode_all(
    entries: &[ComposeEntry],
    cancel:  &AtomicBool,
) -> Result<Vec<RgbaImage>, ComposeError> {
    entries
        .par_iter()
        .map(|entry| {
            if cancel.load(Ordering::Relaxed) {
                return Err(ComposeError::Cancelled);
            }
            decode_rgba(entry.bytes.as_slice()).map_err(|source| ComposeError::Decode {
                name: entry.name.clone(),
                source,
            })
        })
        .collect()
}

/// Result of probing one capture: natural size plus a strip thumbnail.
pub struct SourceProbe {
    pub width:        u32,
    pub height:       u32,
    pub thumb_width:  u32,
    pub thumb_height: u32,
    pub thumb_rgba:   Vec<u8>,
}

/// Decode a capture once to learn its natural size and produce the strip
/// thumbnail. Runs on a probe thread; compose decodes again later from the
/// shared bytes (captures are small enough that caching decoded pixels
/// per entry is not worth the resident memory).
pub fn probe_pixels(bytes: &[u8]) -> Result<SourceProbe, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();

    let thumb = img.thumbnail(THUMB_WIDTH, THUMB_WIDTH * 4).to_rgba8();
    let (thumb_width, thumb_height) = thumb.dimensions();

    Ok(SourceProbe {
        width,
        height,
        thumb_width,
        thumb_height,
        thumb_rgba: thumb.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_png;
    use substitch_core::state::SourceBytes;

    fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        encode_png(w, h, img.as_raw()).unwrap()
    }

    #[test]
    fn decode_all_settles_every_entry() {
        let entries = vec![
            ComposeEntry {
                name:  "a.png".into(),
                bytes: SourceBytes::new(solid_png(4, 6, [255, 0, 0, 255])),
            },
            ComposeEntry {
                name:  "b.png".into(),
                bytes: SourceBytes::new(solid_png(8, 3, [0, 255, 0, 255])),
            },
        ];
        let cancel = AtomicBool::new(false);
        let images = decode_all(&entries, &cancel).unwrap();
        assert_eq!(images[0].dimensions(), (4, 6));
        assert_eq!(images[1].dimensions(), (8, 3));
    }

    #[test]
    fn decode_failure_names_the_entry() {
        let entries = vec![
            ComposeEntry {
                name:  "good.png".into(),
                bytes: SourceBytes::new(solid_png(2, 2, [0, 0, 0, 255])),
            },
            ComposeEntry {
                name:  "broken.png".into(),
                bytes: SourceBytes::new(vec![0xde, 0xad, 0xbe, 0xef]),
            },
        ];
        let cancel = AtomicBool::new(false);
        match decode_all(&entries, &cancel) {
            Err(ComposeError::Decode { name, .. }) => assert_eq!(name, "broken.png"),
            other => panic!("expected a named decode error, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_flag_aborts_decoding() {
        let entries = vec![ComposeEntry {
            name:  "a.png".into(),
            bytes: SourceBytes::new(solid_png(2, 2, [0, 0, 0, 255])),
        }];
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            decode_all(&entries, &cancel),
            Err(ComposeError::Cancelled)
        ));
    }

    #[test]
    fn probe_reports_natural_size_and_scaled_thumbnail() {
        let bytes = solid_png(400, 200, [10, 20, 30, 255]);
        let probe = probe_pixels(&bytes).unwrap();
        assert_eq!((probe.width, probe.height), (400, 200));
        assert_eq!(probe.thumb_width, THUMB_WIDTH);
        assert_eq!(probe.thumb_height, 96);
        assert_eq!(
            probe.thumb_rgba.len(),
            (probe.thumb_width * probe.thumb_height * 4) as usize
        );
    }
}
