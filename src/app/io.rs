// LogStudio - app/io.rs
//
// The seam between viewer logic and the outside world. Everything the app
// layer reads goes through `LogIo`, so state and merge logic can be driven by
// an in-memory implementation in tests.

use crate::core::model::LogFileRef;
use crate::platform::fs;
use crate::util::constants;
use std::io;
use std::path::Path;

/// File access required by the viewer.
pub trait LogIo: Send + Sync {
    /// Read the whole file as text.
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// List log files directly inside `dir`, sorted by name.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<LogFileRef>>;
}

/// Real filesystem implementation.
#[derive(Debug, Clone)]
pub struct FsLogIo {
    include_patterns: Vec<String>,
}

impl FsLogIo {
    pub fn new(include_patterns: Vec<String>) -> Self {
        Self { include_patterns }
    }
}

impl Default for FsLogIo {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl LogIo for FsLogIo {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_file_lossy(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<LogFileRef>> {
        fs::list_log_files(dir, &self.include_patterns)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_io_lists_only_matching_files() {
        let dir = TempDir::new().expect("tmpdir");
        std::fs::write(dir.path().join("z.log"), "x").expect("write");
        std::fs::write(dir.path().join("a.log"), "y").expect("write");
        std::fs::write(dir.path().join("readme.md"), "z").expect("write");

        let io = FsLogIo::default();
        let files = io.list_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.log", "z.log"]);
        assert_eq!(io.read_file(&files[1].path).unwrap(), "x");
    }
}
