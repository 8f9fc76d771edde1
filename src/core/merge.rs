// LogStudio - core/merge.rs
//
// Multi-source merge: combine entries parsed from several files into one
// chronologically ordered sequence.
//
// Each entry is tagged with its source name, the combined list is stably
// sorted by timestamp, and line numbers are reassigned 1..=N so they act as
// unique row ids in the merged view. Timestamps that cannot be interpreted
// sort as 0 (before every real timestamp), keeping their relative order.
//
// Core layer: pure logic. Reading the files lives in app::multi.

use crate::core::model::LogEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive layouts accepted for sorting, tried in order. Interpreted as UTC.
/// `%.f` also matches when the fractional part is absent.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%dT%H:%M:%S%.f",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Sort key for a captured timestamp: milliseconds since the Unix epoch.
///
/// Accepts RFC 3339 (with offset), `YYYY-MM-DD HH:MM:SS[.fff]` (space or `T`,
/// `-` or `/` date separators, read as UTC) and bare dates (midnight UTC).
/// Anything else returns 0.
pub fn timestamp_sort_key(timestamp: &str) -> i64 {
    let s = timestamp.trim();
    if s.is_empty() {
        return 0;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_millis();
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return ndt.and_utc().timestamp_millis();
        }
    }

    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
                return ndt.and_utc().timestamp_millis();
            }
        }
    }

    0
}

/// Merge per-source entry lists into one chronological sequence.
///
/// `sources` pairs a display name (normally the file's base name) with the
/// entries parsed from it. Ties keep source order, then in-source order.
pub fn merge_sources(sources: Vec<(String, Vec<LogEntry>)>) -> Vec<LogEntry> {
    let source_count = sources.len();
    let mut merged: Vec<LogEntry> = sources
        .into_iter()
        .flat_map(|(name, entries)| {
            entries.into_iter().map(move |mut entry| {
                entry.source_file = Some(name.clone());
                entry
            })
        })
        .collect();

    // Stable: equal keys keep their concatenation order.
    merged.sort_by_cached_key(|entry| timestamp_sort_key(&entry.timestamp));

    for (idx, entry) in merged.iter_mut().enumerate() {
        entry.original_line_number = idx as u64 + 1;
    }

    tracing::debug!(
        sources = source_count,
        entries = merged.len(),
        "Merged sources"
    );

    merged
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(line: u64, timestamp: &str, message: &str) -> LogEntry {
        LogEntry {
            original_line_number: line,
            timestamp: timestamp.to_string(),
            level: "INFO".to_string(),
            namespace: "App".to_string(),
            message: message.to_string(),
            full_text: format!("{timestamp} | INFO | App | {message}"),
            is_multi_line: false,
            line_count: 1,
            source_file: None,
        }
    }

    #[test]
    fn test_sort_key_formats() {
        let base = timestamp_sort_key("2025-01-01 12:00:00");
        assert!(base > 0);
        assert_eq!(timestamp_sort_key("2025-01-01T12:00:00"), base);
        assert_eq!(timestamp_sort_key("2025/01/01 12:00:00"), base);
        assert_eq!(timestamp_sort_key("2025-01-01 12:00:00.250"), base + 250);
        assert_eq!(timestamp_sort_key("2025-01-01T12:00:00Z"), base);
        assert_eq!(timestamp_sort_key("2025-01-01T13:00:00+01:00"), base);
        assert_eq!(
            timestamp_sort_key("2025-01-01"),
            base - 12 * 60 * 60 * 1000
        );
    }

    #[test]
    fn test_sort_key_unparseable_is_zero() {
        assert_eq!(timestamp_sort_key(""), 0);
        assert_eq!(timestamp_sort_key("not a date"), 0);
        assert_eq!(timestamp_sort_key("12:00:00"), 0);
    }

    #[test]
    fn test_merge_interleaves_and_renumbers() {
        let a = vec![entry(1, "2025-01-01 12:00:02.000", "a2")];
        let b = vec![entry(1, "2025-01-01 12:00:01.000", "b1")];

        let merged = merge_sources(vec![("a.log".to_string(), a), ("b.log".to_string(), b)]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].message, "b1");
        assert_eq!(merged[0].source_file.as_deref(), Some("b.log"));
        assert_eq!(merged[0].original_line_number, 1);
        assert_eq!(merged[1].message, "a2");
        assert_eq!(merged[1].source_file.as_deref(), Some("a.log"));
        assert_eq!(merged[1].original_line_number, 2);
    }

    #[test]
    fn test_merge_is_stable_for_equal_and_unknown_timestamps() {
        let a = vec![
            entry(1, "garbage", "a-unknown"),
            entry(2, "2025-01-01 12:00:00.000", "a-same"),
        ];
        let b = vec![
            entry(1, "2025-01-01 12:00:00.000", "b-same"),
            entry(2, "", "b-unknown"),
        ];

        let merged = merge_sources(vec![("a".to_string(), a), ("b".to_string(), b)]);
        let order: Vec<_> = merged.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(order, vec!["a-unknown", "b-unknown", "a-same", "b-same"]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_sources(Vec::new()).is_empty());
        assert!(merge_sources(vec![("x".to_string(), Vec::new())]).is_empty());
    }
}
