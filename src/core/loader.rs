// LogStudio - core/loader.rs
//
// Incremental loader: keeps one source's parsed entries in step with a file
// that grows, shrinks, or is replaced.
//
// States: Empty -> Loading (first cycle) -> Loaded, Loaded -> Loaded on every
// change notification. Each cycle compares the new content length against the
// length seen last time:
//   - first load         -> parse everything
//   - grown              -> parse only the appended bytes, append entries
//   - shrunk             -> truncation or replacement; parse everything again
//   - same size          -> nothing to do
//
// Growth assumes the previously seen bytes are unchanged and that they ended
// on a record boundary. When a record was still being written at the previous
// read, its continuation lines show up as separate UNKNOWN entries; this is an
// accepted approximation, not an exact diff.
//
// Core layer: receives content from the app layer, never reads files itself.

use crate::core::model::LogEntry;
use crate::core::parser::{count_complete_lines, parse_content};
use crate::core::schema::LogSchema;

// =============================================================================
// Planning (pure)
// =============================================================================

/// What a reload cycle has to do, given the previous and current sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPlan {
    /// Discard everything and parse the whole content from line 1.
    Full { reason: FullReloadReason },

    /// Parse `content[from_byte..]` with `line_offset` and append.
    Append { from_byte: usize, line_offset: u64 },

    /// Nothing changed.
    Unchanged,
}

/// Why a cycle fell back to a full parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullReloadReason {
    /// No successful load yet (or the schema changed since).
    Initial,
    /// The content is shorter than last time: truncated or replaced.
    Shrunk,
    /// The previous size does not fall on a character boundary of the new
    /// content, so the prefix cannot be the same text.
    Misaligned,
}

/// Decide how to bring entries up to date with `content`.
///
/// `previous_size` is `None` when nothing has been loaded for this source.
pub fn plan_reload(previous_size: Option<usize>, content: &str) -> ReloadPlan {
    let current = content.len();
    match previous_size {
        None => ReloadPlan::Full {
            reason: FullReloadReason::Initial,
        },
        Some(last) if current == last => ReloadPlan::Unchanged,
        Some(last) if current < last => ReloadPlan::Full {
            reason: FullReloadReason::Shrunk,
        },
        Some(last) if !content.is_char_boundary(last) => ReloadPlan::Full {
            reason: FullReloadReason::Misaligned,
        },
        Some(last) => ReloadPlan::Append {
            from_byte: last,
            line_offset: count_complete_lines(&content[..last]),
        },
    }
}

/// Result of one reload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// First load for the source; `count` entries parsed.
    Initial { count: usize },
    /// `count` new entries appended after growth.
    Appended { count: usize },
    /// Full re-parse after truncation/replacement; `count` entries total.
    Reloaded { count: usize },
    /// Size unchanged; entries untouched.
    Unchanged,
}

/// Stateless reload: given the entries and size from the previous cycle and
/// the current content, return the updated entries and the new size.
pub fn incremental_reload(
    previous: Vec<LogEntry>,
    previous_size: Option<usize>,
    content: &str,
    schema: &LogSchema,
) -> (Vec<LogEntry>, usize, ReloadOutcome) {
    match plan_reload(previous_size, content) {
        ReloadPlan::Unchanged => (previous, content.len(), ReloadOutcome::Unchanged),
        ReloadPlan::Append {
            from_byte,
            line_offset,
        } => {
            let new_entries = parse_content(&content[from_byte..], schema, line_offset);
            let count = new_entries.len();
            let mut entries = previous;
            entries.extend(new_entries);
            (entries, content.len(), ReloadOutcome::Appended { count })
        }
        ReloadPlan::Full { reason } => {
            let entries = parse_content(content, schema, 0);
            let count = entries.len();
            let outcome = match reason {
                FullReloadReason::Initial => ReloadOutcome::Initial { count },
                FullReloadReason::Shrunk | FullReloadReason::Misaligned => {
                    ReloadOutcome::Reloaded { count }
                }
            };
            (entries, content.len(), outcome)
        }
    }
}

// =============================================================================
// Stateful loader
// =============================================================================

/// Loader lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderState {
    #[default]
    Empty,
    Loading,
    Loaded,
}

/// Per-source incremental loader.
#[derive(Debug, Clone)]
pub struct IncrementalLoader {
    schema: LogSchema,
    state: LoaderState,
    entries: Vec<LogEntry>,
    last_size: Option<usize>,
}

impl IncrementalLoader {
    pub fn new(schema: LogSchema) -> Self {
        Self {
            schema,
            state: LoaderState::Empty,
            entries: Vec::new(),
            last_size: None,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn schema(&self) -> &LogSchema {
        &self.schema
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Byte length of the content seen by the last successful cycle
    /// (0 before the first load).
    pub fn last_size(&self) -> usize {
        self.last_size.unwrap_or(0)
    }

    /// Mark the start of the first load. Later cycles stay `Loaded`.
    pub fn begin_load(&mut self) {
        if self.state == LoaderState::Empty {
            self.state = LoaderState::Loading;
        }
    }

    /// Run one reload cycle against freshly read content.
    pub fn apply_content(&mut self, content: &str) -> ReloadOutcome {
        let previous = std::mem::take(&mut self.entries);
        let (entries, size, outcome) =
            incremental_reload(previous, self.last_size, content, &self.schema);

        self.entries = entries;
        self.last_size = Some(size);
        self.state = LoaderState::Loaded;

        match outcome {
            ReloadOutcome::Unchanged => {
                tracing::trace!(size, "Reload: content unchanged");
            }
            ReloadOutcome::Appended { count } => {
                tracing::debug!(size, appended = count, "Reload: appended new entries");
            }
            ReloadOutcome::Initial { count } => {
                tracing::info!(size, entries = count, "Initial load complete");
            }
            ReloadOutcome::Reloaded { count } => {
                tracing::info!(
                    size,
                    entries = count,
                    "Content shrank or was replaced; re-parsed from scratch"
                );
            }
        }

        outcome
    }

    /// Record a failed read. Entries and size bookkeeping are left untouched
    /// so the next successful cycle picks up where the last one ended.
    pub fn apply_read_failure(&mut self, error: &dyn std::error::Error) {
        tracing::warn!(error = %error, "Read failed; keeping previously loaded entries");
        if self.state == LoaderState::Loading && self.last_size.is_none() {
            self.state = LoaderState::Empty;
        }
    }

    /// Replace the schema. A different pattern or field mapping discards all
    /// entries so the next cycle parses from scratch; returns true in that case.
    pub fn set_schema(&mut self, schema: LogSchema) -> bool {
        let changed = !self.schema.same_definition(&schema);
        self.schema = schema;
        if changed {
            tracing::info!("Schema changed; forcing full reload");
            self.entries.clear();
            self.last_size = None;
            self.state = LoaderState::Empty;
        }
        changed
    }

    /// Forget all loaded content (e.g. when the source is closed).
    pub fn reset(&mut self) {
        self.entries.clear();
        self.last_size = None;
        self.state = LoaderState::Empty;
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{compile, SchemaDefinition};

    const L1: &str = "2025-01-01 12:00:00.000 | INFO | App | one";
    const L2: &str = "2025-01-01 12:00:01.000 | WARN | App.Db | two";
    const L3: &str = "2025-01-01 12:00:02.000 | ERROR | App.Db | three";

    #[test]
    fn test_plan_initial_growth_shrink_unchanged() {
        assert_eq!(
            plan_reload(None, "abc"),
            ReloadPlan::Full {
                reason: FullReloadReason::Initial
            }
        );
        assert_eq!(plan_reload(Some(3), "abc"), ReloadPlan::Unchanged);
        assert_eq!(
            plan_reload(Some(5), "abc"),
            ReloadPlan::Full {
                reason: FullReloadReason::Shrunk
            }
        );
        assert_eq!(
            plan_reload(Some(4), "a\nb\ncd"),
            ReloadPlan::Append {
                from_byte: 4,
                line_offset: 2
            }
        );
    }

    #[test]
    fn test_plan_misaligned_prefix_falls_back_to_full() {
        // "é" is two bytes; a previous size of 1 splits it.
        assert_eq!(
            plan_reload(Some(1), "é and more"),
            ReloadPlan::Full {
                reason: FullReloadReason::Misaligned
            }
        );
    }

    #[test]
    fn test_loader_lifecycle() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        assert_eq!(loader.state(), LoaderState::Empty);

        loader.begin_load();
        assert_eq!(loader.state(), LoaderState::Loading);

        let content = format!("{L1}\n{L2}\n");
        assert_eq!(
            loader.apply_content(&content),
            ReloadOutcome::Initial { count: 2 }
        );
        assert_eq!(loader.state(), LoaderState::Loaded);
        assert_eq!(loader.last_size(), content.len());

        loader.begin_load();
        assert_eq!(loader.state(), LoaderState::Loaded);
    }

    #[test]
    fn test_growth_appends_with_correct_line_numbers() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        loader.apply_content(&format!("{L1}\n{L2}\n"));
        let before: Vec<_> = loader.entries().to_vec();

        let grown = format!("{L1}\n{L2}\n{L3}");
        assert_eq!(
            loader.apply_content(&grown),
            ReloadOutcome::Appended { count: 1 }
        );

        let entries = loader.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(&entries[..2], &before[..]);
        assert_eq!(entries[2].original_line_number, 3);
        assert_eq!(entries[2].level, "ERROR");
        assert_eq!(loader.last_size(), grown.len());
    }

    /// Newline-terminated writes leave the earlier last entry with the blank
    /// continuation it had when it was read. Only a full reload drops it.
    #[test]
    fn test_newline_terminated_growth_keeps_earlier_trailing_blank() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        loader.apply_content(&format!("{L1}\n"));

        let grown = format!("{L1}\n{L2}\n");
        assert_eq!(
            loader.apply_content(&grown),
            ReloadOutcome::Appended { count: 1 }
        );

        let incremental = loader.entries();
        let full = parse_content(&grown, &LogSchema::builtin(), 0);
        assert_eq!(incremental.len(), 2);
        assert_eq!(full.len(), 2);

        assert_eq!(incremental[0].line_count, 2);
        assert!(incremental[0].is_multi_line);
        assert_eq!(incremental[0].message, "one\n");
        assert_eq!(full[0].line_count, 1);
        assert!(!full[0].is_multi_line);

        // The newest entry matches either way.
        assert_eq!(incremental[1], full[1]);
        assert_eq!(incremental[1].original_line_number, 2);
    }

    #[test]
    fn test_shrink_reparses_from_scratch() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        loader.apply_content(&format!("{L1}\n{L2}\n{L3}"));
        assert_eq!(loader.entries().len(), 3);

        assert_eq!(
            loader.apply_content(L3),
            ReloadOutcome::Reloaded { count: 1 }
        );
        assert_eq!(loader.entries().len(), 1);
        assert_eq!(loader.entries()[0].original_line_number, 1);
        assert_eq!(loader.last_size(), L3.len());
    }

    #[test]
    fn test_same_size_is_noop() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        loader.apply_content(L1);
        let snapshot = loader.entries().to_vec();
        assert_eq!(loader.apply_content(L1), ReloadOutcome::Unchanged);
        assert_eq!(loader.entries(), &snapshot[..]);
    }

    #[test]
    fn test_read_failure_keeps_entries() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        loader.apply_content(L1);

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        loader.apply_read_failure(&err);

        assert_eq!(loader.state(), LoaderState::Loaded);
        assert_eq!(loader.entries().len(), 1);
        assert_eq!(loader.last_size(), L1.len());
    }

    #[test]
    fn test_read_failure_on_first_load_returns_to_empty() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        loader.begin_load();
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        loader.apply_read_failure(&err);
        assert_eq!(loader.state(), LoaderState::Empty);
    }

    #[test]
    fn test_schema_change_forces_full_reload() {
        let mut loader = IncrementalLoader::new(LogSchema::builtin());
        let content = format!("{L1}\n{L2}");
        loader.apply_content(&content);
        assert_eq!(loader.entries().len(), 2);

        // Same definition: nothing is discarded.
        assert!(!loader.set_schema(LogSchema::builtin()));
        assert_eq!(loader.entries().len(), 2);

        // Swap namespace and message groups.
        let swapped = compile(SchemaDefinition {
            fields: crate::core::schema::FieldMap {
                namespace: 4,
                message: 3,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        assert!(loader.set_schema(swapped));
        assert!(loader.entries().is_empty());

        // Same size as before, but still a full parse.
        assert_eq!(
            loader.apply_content(&content),
            ReloadOutcome::Initial { count: 2 }
        );
        assert_eq!(loader.entries()[0].namespace, "one");
    }

    #[test]
    fn test_stateless_reload_matches_loader() {
        let schema = LogSchema::builtin();
        let first = format!("{L1}\n");
        let (entries, size, outcome) = incremental_reload(Vec::new(), None, &first, &schema);
        assert_eq!(outcome, ReloadOutcome::Initial { count: 1 });

        let grown = format!("{first}{L2}");
        let (entries, size, outcome) = incremental_reload(entries, Some(size), &grown, &schema);
        assert_eq!(outcome, ReloadOutcome::Appended { count: 1 });
        assert_eq!(size, grown.len());
        assert_eq!(entries[1].original_line_number, 2);
    }
}
