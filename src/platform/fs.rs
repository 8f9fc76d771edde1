// LogStudio - platform/fs.rs
//
// Filesystem access: whole-file reads, directory listing, and cheap metadata
// snapshots for change detection.
//
// Reads never fail on encoding: invalid UTF-8 is replaced, so a log with a
// stray binary byte still loads.

use crate::core::model::LogFileRef;
use crate::util::constants;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

// =============================================================================
// Reading
// =============================================================================

/// Read the full content of a file as text (lossy UTF-8).
///
/// Files above `LARGE_FILE_THRESHOLD` are memory-mapped; smaller files are read
/// into memory with retries on transient I/O errors.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let len = std::fs::metadata(path)?.len();
    if len > constants::LARGE_FILE_THRESHOLD {
        tracing::debug!(file = %path.display(), size = len, "Memory-mapping large file");
        read_large_file(path)
    } else {
        read_small_file_with_retry(path)
    }
}

/// Read using `memmap2` for large files (avoids a second full-size buffer).
fn read_large_file(path: &Path) -> io::Result<String> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is read-only and dropped before returning. A concurrent
    // writer can change bytes under us; the worst outcome is a torn read that
    // the next change notification corrects.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

/// Read a small file with transient-error retries.
fn read_small_file_with_retry(path: &Path) -> io::Result<String> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..constants::MAX_READ_RETRIES {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(
                    constants::READ_RETRY_DELAYS_MS[attempt as usize],
                ));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// =============================================================================
// Listing
// =============================================================================

/// List regular files directly inside `dir` whose file name matches any of
/// `include_patterns` (glob syntax, e.g. `*.log`). Not recursive.
///
/// Invalid patterns are skipped with a warning. Results are sorted by name.
pub fn list_log_files(dir: &Path, include_patterns: &[String]) -> io::Result<Vec<LogFileRef>> {
    let patterns: Vec<glob::Pattern> = include_patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pat) => Some(pat),
            Err(e) => {
                tracing::warn!(pattern = %p, error = %e, "Invalid include pattern, skipping");
                None
            }
        })
        .collect();

    let mut files = Vec::new();
    for dir_entry in std::fs::read_dir(dir)? {
        let dir_entry = match dir_entry {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let is_file = dir_entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }

        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if patterns.iter().any(|p| p.matches(&name)) {
            files.push(LogFileRef {
                name,
                path: dir_entry.path(),
            });
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(dir = %dir.display(), count = files.len(), "Listed log files");
    Ok(files)
}

// =============================================================================
// Metadata
// =============================================================================

/// Size and modification time of a file, used to detect changes by polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

pub fn file_stat(path: &Path) -> io::Result<FileStat> {
    let meta = std::fs::metadata(path)?;
    Ok(FileStat {
        len: meta.len(),
        modified: meta.modified().ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_replaces_invalid_utf8() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("bad.log");
        fs::write(&path, b"ok \xff line\n").expect("write");

        let content = read_file_lossy(&path).unwrap();
        assert_eq!(content, "ok \u{FFFD} line\n");
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let dir = TempDir::new().expect("tmpdir");
        let err = read_file_lossy(&dir.path().join("nope.log")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_list_filters_sorts_and_skips_dirs() {
        let dir = TempDir::new().expect("tmpdir");
        fs::write(dir.path().join("b.log"), b"").expect("write");
        fs::write(dir.path().join("a.log"), b"").expect("write");
        fs::write(dir.path().join("notes.txt"), b"").expect("write");
        fs::create_dir(dir.path().join("nested.log")).expect("mkdir");

        let files = list_log_files(dir.path(), &["*.log".to_string()]).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.log", "b.log"]);
        assert_eq!(files[0].path, dir.path().join("a.log"));
    }

    #[test]
    fn test_list_multiple_patterns_and_invalid_pattern() {
        let dir = TempDir::new().expect("tmpdir");
        fs::write(dir.path().join("app.log"), b"").expect("write");
        fs::write(dir.path().join("app.txt"), b"").expect("write");

        let patterns = vec!["[".to_string(), "*.txt".to_string(), "*.log".to_string()];
        let files = list_log_files(dir.path(), &patterns).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_file_stat_reports_length() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("x.log");
        fs::write(&path, b"12345").expect("write");
        assert_eq!(file_stat(&path).unwrap().len, 5);
    }
}
