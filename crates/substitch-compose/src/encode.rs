// crates/substitch-compose/src/encode.rs
//
// PNG serialization of composed pixels. One encode per compose call; the
// same bytes back both the on-screen preview and the exported file.

use std::path::Path;

use anyhow::{Context, Result};

/// Encode straight-alpha RGBA pixels as a PNG byte stream.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
    debug_assert_eq!(rgba.len(), (width as usize) * (height as usize) * 4);

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().context("PNG header")?;
    writer.write_image_data(rgba).context("PNG image data")?;
    writer.finish().context("PNG finish")?;
    Ok(out)
}

/// Write an already-encoded PNG to disk.
pub fn save_png_file(path: &Path, png: &[u8]) -> Result<()> {
    std::fs::write(path, png)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_png_decodes_to_the_same_pixels() {
        let rgba: Vec<u8> = (0..3u32 * 2 * 4).map(|i| (i * 7 % 251) as u8).collect();
        let png_bytes = encode_png(3, 2, &rgba).unwrap();

        let decoder = png::Decoder::new(std::io::Cursor::new(&png_bytes));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0u8; reader.output_buffer_size().unwrap()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(&buf[..info.buffer_size()], rgba.as_slice());
    }
}
