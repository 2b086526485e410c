// crates/substitch-ui/src/helpers/format.rs
//
// Label formatting shared by the strip cards and the compose panel.

/// Format pixel dimensions as `WxH`.
pub fn format_dims(width: u32, height: u32) -> String {
    format!("{width}\u{00d7}{height}")
}

/// Format a byte count as a compact human-readable string.
///
/// | Range      | Format   | Example  |
/// |------------|----------|----------|
/// | >= 1 MiB   | `X.X MB` | `2.1 MB` |
/// | >= 1 KiB   | `X.X KB` | `84.3 KB`|
/// | < 1 KiB    | `N B`    | `512 B`  |
pub fn format_bytes(len: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let len = len as f64;
    if len >= MIB {
        format!("{:.1} MB", len / MIB)
    } else if len >= KIB {
        format!("{:.1} KB", len / KIB)
    } else {
        format!("{len} B")
    }
}

/// Clip a label to at most `max` bytes on a char boundary.
pub fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max)
        .last()
        .unwrap_or(0);
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_use_multiplication_sign() {
        assert_eq!(format_dims(1920, 1080), "1920\u{00d7}1080");
    }

    #[test]
    fn bytes_pick_the_right_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(86_323), "84.3 KB");
        assert_eq!(format_bytes(2_202_010), "2.1 MB");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 16), "short");
        let clipped = truncate("subtitle_capture_0123.png", 12);
        assert!(clipped.len() <= 13);
        assert!("subtitle_capture_0123.png".starts_with(clipped));
        // Multi-byte input never splits a char.
        let multi = truncate("字幕字幕字幕字幕", 7);
        assert!(multi.chars().count() <= 3);
    }
}
