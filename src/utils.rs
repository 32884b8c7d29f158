//! Utility functions for log formatting and output file handling.
//!
//! - String truncation for log lines
//! - Output path validation before the feed is written

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Cuts at a character boundary, so Polish diacritics never split. Longer
/// strings get `"..."` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("Złoty słabnie", 5), "Złoty...");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}...", &s[..cut]),
    }
}

/// Ensure the directory that will hold `path` exists and is writable.
///
/// Creates missing parent directories, then performs a write test by
/// creating and immediately deleting a probe file next to the target.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The parent directory is not writable
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_output_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
