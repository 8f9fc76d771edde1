// LogStudio - core/filter.rs
//
// Compound filter engine for log entries.
// Level, namespace, and search filters are AND-combined; within the
// namespace filter the selected paths are OR-combined hierarchically.
// Core layer: pure logic, no I/O.

use crate::core::model::LogEntry;
use crate::core::namespace::is_same_or_descendant;
use std::collections::BTreeSet;

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Levels to include (empty = all).
    pub levels: BTreeSet<String>,

    /// Selected namespaces (empty = all). An entry passes if its namespace
    /// equals a selected one or lies beneath it.
    pub namespaces: BTreeSet<String>,

    /// Case-insensitive substring searched in `full_text`. Empty = no filter.
    pub search_text: String,
}

impl FilterState {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty() && self.namespaces.is_empty() && self.search_text.is_empty()
    }

    /// Convenience constructor from borrowed slices.
    pub fn new(levels: &[&str], namespaces: &[&str], search_text: &str) -> Self {
        Self {
            levels: levels.iter().map(|s| s.to_string()).collect(),
            namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
            search_text: search_text.to_string(),
        }
    }
}

/// Apply filters to a slice of entries, returning indices of matching entries
/// in input order.
///
/// Indices avoid copying entries and map directly onto a virtualised list.
pub fn apply_filters(entries: &[LogEntry], filter: &FilterState) -> Vec<usize> {
    if filter.is_empty() {
        return (0..entries.len()).collect();
    }

    let search_lower = filter.search_text.to_lowercase();

    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches_all(entry, filter, &search_lower))
        .map(|(idx, _)| idx)
        .collect()
}

/// Apply filters and return the matching entries as an owned subsequence.
pub fn filter_entries(entries: &[LogEntry], filter: &FilterState) -> Vec<LogEntry> {
    apply_filters(entries, filter)
        .into_iter()
        .map(|idx| entries[idx].clone())
        .collect()
}

/// True if `namespace` passes a non-empty namespace selection.
pub fn namespace_matches(namespace: &str, selected: &BTreeSet<String>) -> bool {
    selected
        .iter()
        .any(|s| is_same_or_descendant(namespace, s))
}

/// Check if a single entry matches all active filters.
fn matches_all(entry: &LogEntry, filter: &FilterState, search_lower: &str) -> bool {
    if !filter.levels.is_empty() && !filter.levels.contains(&entry.level) {
        return false;
    }

    if !filter.namespaces.is_empty() && !namespace_matches(&entry.namespace, &filter.namespaces) {
        return false;
    }

    if !search_lower.is_empty() && !entry.full_text.to_lowercase().contains(search_lower) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(line: u64, level: &str, namespace: &str, text: &str) -> LogEntry {
        LogEntry {
            original_line_number: line,
            timestamp: "2025-01-01 12:00:00.000".to_string(),
            level: level.to_string(),
            namespace: namespace.to_string(),
            message: text.to_string(),
            full_text: format!("2025-01-01 12:00:00.000 | {level} | {namespace} | {text}"),
            is_multi_line: false,
            line_count: 1,
            source_file: None,
        }
    }

    fn sample() -> Vec<LogEntry> {
        vec![
            make_entry(1, "INFO", "App.Service", "Started service"),
            make_entry(2, "ERROR", "App.Service.Sub", "Connection FAILED"),
            make_entry(3, "WARN", "App.Other", "Slow response"),
            make_entry(4, "DEBUG", "Db", "Query plan"),
        ]
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let entries = sample();
        let result = apply_filters(&entries, &FilterState::default());
        assert_eq!(result, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_level_filter() {
        let entries = sample();
        let result = apply_filters(&entries, &FilterState::new(&["ERROR", "WARN"], &[], ""));
        assert_eq!(result, vec![1, 2]);
    }

    #[test]
    fn test_namespace_filter_is_hierarchical() {
        let entries = sample();
        let result = filter_entries(&entries, &FilterState::new(&[], &["App.Service"], ""));
        let namespaces: Vec<_> = result.iter().map(|e| e.namespace.as_str()).collect();
        assert_eq!(namespaces, vec!["App.Service", "App.Service.Sub"]);
    }

    #[test]
    fn test_namespace_filter_or_across_selection() {
        let entries = sample();
        let result = apply_filters(&entries, &FilterState::new(&[], &["App.Other", "Db"], ""));
        assert_eq!(result, vec![2, 3]);
    }

    #[test]
    fn test_namespace_prefix_without_dot_does_not_match() {
        let entries = vec![make_entry(1, "INFO", "Application", "x")];
        let result = apply_filters(&entries, &FilterState::new(&[], &["App"], ""));
        assert!(result.is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_over_full_text() {
        let entries = sample();
        let result = apply_filters(&entries, &FilterState::new(&[], &[], "failed"));
        assert_eq!(result, vec![1]);

        // Namespace text is part of full_text and therefore searchable.
        let result = apply_filters(&entries, &FilterState::new(&[], &[], "db"));
        assert_eq!(result, vec![3]);
    }

    #[test]
    fn test_search_reaches_continuation_lines() {
        let mut entry = make_entry(1, "ERROR", "App", "Boom");
        entry.full_text.push_str("\n  at Widget.Render()");
        entry.is_multi_line = true;
        entry.line_count = 2;
        let result = apply_filters(&[entry], &FilterState::new(&[], &[], "WIDGET"));
        assert_eq!(result, vec![0]);
    }

    #[test]
    fn test_combined_filters() {
        let entries = sample();
        let filter = FilterState::new(&["ERROR", "INFO"], &["App"], "connection");
        assert_eq!(apply_filters(&entries, &filter), vec![1]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let entries = sample();
        let filter = FilterState::new(&["INFO", "ERROR"], &["App.Service"], "e");
        let once = filter_entries(&entries, &filter);
        let twice = filter_entries(&once, &filter);
        assert_eq!(once, twice);
    }
}
