//! Small helpers for logging and file system validation.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes with an ellipsis
/// and byte count indicator appended. The cut backs up to the nearest
/// character boundary, so multi-byte text never splits mid-character.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if absent, then performs a write test by
/// creating and immediately deleting a marker file. Run before any
/// network work so a bad `--out-dir` fails fast instead of after a full
/// fetch pass.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let marker_path = format!("{}/..__write_check__", path.trim_end_matches('/'));
    match stdfs::File::create(&marker_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&marker_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_backs_off_mid_character_cut() {
        // 79 ASCII bytes followed by a two-byte character; a cut at
        // byte 80 would land inside it.
        let s = format!("{}£ sterling headline", "a".repeat(79));
        let result = truncate_for_log(&s, 80);
        assert!(result.starts_with(&"a".repeat(79)));
        assert!(result.contains("…(+"));

        // Cutting exactly on a boundary keeps the full character.
        let t = format!("{}£", "a".repeat(79));
        assert_eq!(truncate_for_log(&t, 81), t);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = std::env::temp_dir().join(format!("rns_write_check_{}", std::process::id()));
        let path = dir.to_str().unwrap().to_string();
        ensure_writable_dir(&path).await.unwrap();
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&dir).ok();
    }
}
