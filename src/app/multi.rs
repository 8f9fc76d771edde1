// LogStudio - app/multi.rs
//
// Multi-file loading: read and parse several files concurrently on the rayon
// pool, then merge them into one chronological view.
//
// A file that cannot be read is logged and skipped; the merge proceeds with
// whatever did load. The result is a one-shot snapshot (no incremental
// reload or watching in multi-file mode).

use crate::app::io::LogIo;
use crate::core::merge::merge_sources;
use crate::core::model::LogEntry;
use crate::core::parser::parse_content;
use crate::core::schema::LogSchema;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Display name for a source: the path's final component.
pub fn source_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load, parse and merge `paths`.
///
/// Returns the merged entries plus the paths that failed to read.
pub fn load_merged(
    paths: &[PathBuf],
    schema: &LogSchema,
    io: &dyn LogIo,
) -> (Vec<LogEntry>, Vec<PathBuf>) {
    let results: Vec<(PathBuf, Option<Vec<LogEntry>>)> = paths
        .par_iter()
        .map(|path| match io.read_file(path) {
            Ok(content) => {
                let entries = parse_content(&content, schema, 0);
                tracing::debug!(
                    file = %path.display(),
                    entries = entries.len(),
                    "Parsed source for merge"
                );
                (path.clone(), Some(entries))
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                (path.clone(), None)
            }
        })
        .collect();

    // par_iter().collect() keeps input order, so ties still break by the
    // order the files were given in.
    let mut failed = Vec::new();
    let mut sources = Vec::with_capacity(results.len());
    for (path, entries) in results {
        match entries {
            Some(entries) => sources.push((source_name_of(&path), entries)),
            None => failed.push(path),
        }
    }

    let merged = merge_sources(sources);
    tracing::info!(
        files = paths.len(),
        failed = failed.len(),
        entries = merged.len(),
        "Multi-file load complete"
    );
    (merged, failed)
}
