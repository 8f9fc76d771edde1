// LogStudio - app/state.rs
//
// Viewer state: the open source(s), the current schema, the filter selection
// and the cached filtered view.
//
// Single-file mode owns an `IncrementalLoader` and follows the file as it
// changes. Multi-file mode holds a merged snapshot that is re-read in full on
// explicit reload. Every mutation goes through `&mut self`, so reloads run
// one at a time and can never interleave.

use crate::app::io::LogIo;
use crate::app::multi::load_merged;
use crate::core::filter::{self, FilterState};
use crate::core::loader::{IncrementalLoader, ReloadOutcome};
use crate::core::model::{LogEntry, WatchEvent};
use crate::core::namespace::{self, NamespaceNode};
use crate::core::schema::LogSchema;
use crate::util::error::{LogStudioError, Result};
use std::path::{Path, PathBuf};

/// What is currently open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Source {
    #[default]
    None,
    Single(PathBuf),
    Multi(Vec<PathBuf>),
}

/// Top-level viewer state.
#[derive(Debug)]
pub struct ViewerState {
    source: Source,

    /// Single-file loader. Also holds the active schema.
    loader: IncrementalLoader,

    /// Multi-file merged snapshot.
    merged: Vec<LogEntry>,

    filter: FilterState,

    /// Indices into `entries()` matching `filter`.
    filtered_indices: Vec<usize>,

    /// Non-fatal problems since the last `take_warnings`.
    warnings: Vec<String>,
}

impl ViewerState {
    pub fn new(schema: LogSchema) -> Self {
        Self {
            source: Source::None,
            loader: IncrementalLoader::new(schema),
            merged: Vec::new(),
            filter: FilterState::default(),
            filtered_indices: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Sources
    // -------------------------------------------------------------------------

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn schema(&self) -> &LogSchema {
        self.loader.schema()
    }

    /// Open a single file for incremental following.
    pub fn open_file(&mut self, path: &Path, io: &dyn LogIo) -> Result<ReloadOutcome> {
        self.source = Source::Single(path.to_path_buf());
        self.merged.clear();
        self.loader.reset();
        self.loader.begin_load();
        let outcome = self.reload_single(path, io);
        self.refilter();
        outcome
    }

    /// Open several files as one merged, chronologically sorted view.
    /// A single path falls back to `open_file`.
    ///
    /// Returns the paths that could not be read.
    pub fn open_files(&mut self, paths: &[PathBuf], io: &dyn LogIo) -> Result<Vec<PathBuf>> {
        if let [only] = paths {
            self.open_file(only, io)?;
            return Ok(Vec::new());
        }

        self.loader.reset();
        self.source = Source::Multi(paths.to_vec());
        let failed = self.reload_multi(paths, io);
        self.refilter();
        Ok(failed)
    }

    /// Drop the current source and all entries.
    pub fn close(&mut self) {
        self.source = Source::None;
        self.loader.reset();
        self.merged.clear();
        self.refilter();
    }

    /// Bring entries up to date with the source.
    ///
    /// Single-file mode reloads incrementally. Multi-file mode re-reads and
    /// re-merges everything.
    pub fn reload(&mut self, io: &dyn LogIo) -> Result<ReloadOutcome> {
        let outcome = match self.source.clone() {
            Source::None => Ok(ReloadOutcome::Unchanged),
            Source::Single(path) => self.reload_single(&path, io),
            Source::Multi(paths) => {
                self.reload_multi(&paths, io);
                Ok(ReloadOutcome::Reloaded {
                    count: self.merged.len(),
                })
            }
        };
        self.refilter();
        outcome
    }

    /// React to a change notification. Only the open single file reloads;
    /// anything else returns `Ok(None)`.
    pub fn handle_change(&mut self, path: &Path, io: &dyn LogIo) -> Result<Option<ReloadOutcome>> {
        let is_open = matches!(&self.source, Source::Single(open) if open == path);
        if !is_open {
            tracing::trace!(file = %path.display(), "Ignoring change for a file that is not open");
            return Ok(None);
        }
        self.reload(io).map(Some)
    }

    /// Apply one watcher event. Errors are recorded as warnings; the entries
    /// already loaded stay visible.
    pub fn handle_event(&mut self, event: &WatchEvent, io: &dyn LogIo) -> Option<ReloadOutcome> {
        match event {
            WatchEvent::Changed { path } => match self.handle_change(path, io) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.warnings.push(e.to_string());
                    None
                }
            },
            WatchEvent::Error { path, message } => {
                tracing::warn!(file = %path.display(), message = %message, "Watch error");
                self.warnings
                    .push(format!("{}: {message}", path.display()));
                None
            }
        }
    }

    /// Replace the schema. A different pattern or field mapping re-parses the
    /// open source from scratch.
    pub fn set_schema(&mut self, schema: LogSchema, io: &dyn LogIo) -> Result<ReloadOutcome> {
        if !self.loader.set_schema(schema) {
            return Ok(ReloadOutcome::Unchanged);
        }
        match self.source {
            Source::None => {
                self.refilter();
                Ok(ReloadOutcome::Unchanged)
            }
            Source::Single(_) => {
                self.loader.begin_load();
                self.reload(io)
            }
            Source::Multi(_) => self.reload(io),
        }
    }

    fn reload_single(&mut self, path: &Path, io: &dyn LogIo) -> Result<ReloadOutcome> {
        match io.read_file(path) {
            Ok(content) => Ok(self.loader.apply_content(&content)),
            Err(e) => {
                self.loader.apply_read_failure(&e);
                Err(LogStudioError::Io {
                    path: path.to_path_buf(),
                    operation: "read",
                    source: e,
                })
            }
        }
    }

    fn reload_multi(&mut self, paths: &[PathBuf], io: &dyn LogIo) -> Vec<PathBuf> {
        let (merged, failed) = load_merged(paths, self.loader.schema(), io);
        for path in &failed {
            self.warnings
                .push(format!("Could not read '{}'", path.display()));
        }
        self.merged = merged;
        failed
    }

    // -------------------------------------------------------------------------
    // Entries and filters
    // -------------------------------------------------------------------------

    /// All entries of the open source, unfiltered.
    pub fn entries(&self) -> &[LogEntry] {
        match self.source {
            Source::Multi(_) => &self.merged,
            _ => self.loader.entries(),
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Replace the whole filter at once.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.refilter();
    }

    pub fn toggle_level(&mut self, level: &str) {
        self.filter.levels = namespace::toggle_level(&self.filter.levels, level);
        self.refilter();
    }

    pub fn toggle_namespace(&mut self, namespace: &str) {
        self.filter.namespaces =
            namespace::toggle_namespace_selection(&self.filter.namespaces, namespace);
        self.refilter();
    }

    pub fn set_search(&mut self, text: &str) {
        self.filter.search_text = text.to_string();
        self.refilter();
    }

    /// Entries passing the current filter, in order.
    pub fn filtered_entries(&self) -> Vec<&LogEntry> {
        let entries = self.entries();
        self.filtered_indices.iter().map(|&i| &entries[i]).collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered_indices.len()
    }

    /// Distinct namespaces present, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        namespace::extract_namespaces(self.entries())
    }

    /// Distinct levels present, sorted.
    pub fn levels(&self) -> Vec<String> {
        namespace::extract_levels(self.entries())
    }

    /// Tree of the distinct namespaces present.
    pub fn namespace_tree(&self) -> NamespaceNode {
        namespace::build_namespace_tree(&self.namespaces())
    }

    /// Return and clear accumulated warnings.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn refilter(&mut self) {
        self.filtered_indices = filter::apply_filters(self.entries(), &self.filter);
        tracing::trace!(
            total = self.entries().len(),
            visible = self.filtered_indices.len(),
            "Filters applied"
        );
    }
}

// =============================================================================
// Unit tests
// =============================================================================
