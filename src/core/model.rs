// LogStudio - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Log Entry (output of parsing)
// =============================================================================

/// One logical log record, spanning one or more physical lines.
///
/// Entries are immutable values once the parser emits them: filtering
/// selects from them, the loader appends or replaces whole entries, and
/// only the multi-file merge rewrites `original_line_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// 1-based physical line number of the record's first line within its
    /// source content. In a merged view this is the position in the merged
    /// sequence instead.
    pub original_line_number: u64,

    /// Raw timestamp text as captured by the schema (not parsed).
    pub timestamp: String,

    /// Uppercased level. `INFO` when the group was empty, `UNKNOWN` for
    /// standalone lines that never matched the schema.
    pub level: String,

    /// Dot-segmented namespace (e.g. `App.Service.Sub`). Empty if absent.
    pub namespace: String,

    /// Message text. Continuation lines are appended newline-separated;
    /// blank continuation lines contribute a bare newline.
    pub message: String,

    /// Complete original text of the record, all physical lines joined by `\n`.
    pub full_text: String,

    /// True when the record spans more than one physical line.
    pub is_multi_line: bool,

    /// Number of physical lines composing the record (always >= 1).
    pub line_count: u32,

    /// Base name of the originating file; only set by the multi-file merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl LogEntry {
    /// Build a fallback entry for a line that matched nothing and had no
    /// open multi-line context to join.
    pub fn unknown(line_number: u64, line: &str) -> Self {
        Self {
            original_line_number: line_number,
            timestamp: String::new(),
            level: crate::util::constants::UNKNOWN_LEVEL.to_string(),
            namespace: String::new(),
            message: line.to_string(),
            full_text: line.to_string(),
            is_multi_line: false,
            line_count: 1,
            source_file: None,
        }
    }

    /// Physical line number of the record's last line.
    pub fn last_line_number(&self) -> u64 {
        self.original_line_number + u64::from(self.line_count.saturating_sub(1))
    }
}

// =============================================================================
// Log file listing
// =============================================================================

/// A candidate log file returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileRef {
    /// File name without directory.
    pub name: String,

    /// Full path to the file.
    pub path: PathBuf,
}

// =============================================================================
// Watch events (background watcher -> owner)
// =============================================================================

/// Messages sent from the file-watch thread to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The watched file's size or modification time changed.
    Changed { path: PathBuf },

    /// The file could not be inspected this cycle (removed, permissions, ...).
    /// Watching continues; previously loaded entries must be kept.
    Error { path: PathBuf, message: String },
}

impl WatchEvent {
    /// Path the event refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            WatchEvent::Changed { path } | WatchEvent::Error { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_entry_defaults() {
        let entry = LogEntry::unknown(7, "garbage line");
        assert_eq!(entry.level, "UNKNOWN");
        assert_eq!(entry.original_line_number, 7);
        assert_eq!(entry.message, "garbage line");
        assert_eq!(entry.full_text, "garbage line");
        assert!(entry.timestamp.is_empty());
        assert!(entry.namespace.is_empty());
        assert_eq!(entry.line_count, 1);
        assert!(!entry.is_multi_line);
    }

    #[test]
    fn test_last_line_number_spans_continuations() {
        let mut entry = LogEntry::unknown(10, "x");
        entry.line_count = 3;
        assert_eq!(entry.last_line_number(), 12);
    }

    #[test]
    fn test_serialises_camel_case_without_source_file() {
        let entry = LogEntry::unknown(1, "x");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"originalLineNumber\":1"));
        assert!(json.contains("\"isMultiLine\":false"));
        assert!(!json.contains("sourceFile"));
    }
}
