// crates/substitch-ui/src/helpers/log.rs
//
// Unified logging for the UI crate.
//
// In release builds with `windows_subsystem = "windows"` (double-click
// launch), there is no console attached, so `eprintln!` output is silently
// discarded. All log calls go to a temp file instead so they're visible
// regardless of launch mode.
//
// File: %TEMP%\substitch.log, append-only, created on first write.
//
// Usage:
//   use crate::helpers::log::vlog;
//   vlog("[import] 3 captures added");
//
// Or use the macro for format string convenience:
//   substitch_log!("[save] {}", path.display());

use std::io::Write;

/// Write `msg` to the SubStitch log file in the OS temp directory.
/// Never panics; failures are silently ignored (this is already the
/// fallback path).
pub fn vlog(msg: &str) {
    if let Ok(mut f) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(std::env::temp_dir().join("substitch.log"))
    {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = writeln!(f, "[{ts}] {msg}");
    }
}

/// Convenience macro: formats like `eprintln!` but routes through `vlog`.
#[macro_export]
macro_rules! substitch_log {
    ($($arg:tt)*) => {
        $crate::helpers::log::vlog(&format!($($arg)*))
    };
}
