// LogStudio - core/export.rs
//
// CSV, JSON and plain-text export of (filtered) log entries.
// Core layer: writes to any Write implementation; the caller owns the target.

use crate::core::model::LogEntry;
use crate::util::error::ExportError;
use std::io::Write;

/// Export entries as CSV.
///
/// Columns: line, timestamp, level, namespace, source_file, message.
/// Multi-line messages are quoted by the csv writer.
pub fn export_csv<W: Write>(entries: &[LogEntry], writer: W) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "line",
        "timestamp",
        "level",
        "namespace",
        "source_file",
        "message",
    ])?;

    let mut count = 0;
    for entry in entries {
        csv_writer.write_record([
            entry.original_line_number.to_string().as_str(),
            &entry.timestamp,
            &entry.level,
            &entry.namespace,
            entry.source_file.as_deref().unwrap_or(""),
            &entry.message,
        ])?;
        count += 1;
    }

    csv_writer.flush()?;

    Ok(count)
}

/// Export entries as a pretty-printed JSON array (camelCase field names).
pub fn export_json<W: Write>(entries: &[LogEntry], writer: W) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, entries)?;
    Ok(entries.len())
}

/// Export entries as their raw record text, one record after another.
pub fn export_text<W: Write>(entries: &[LogEntry], mut writer: W) -> Result<usize, ExportError> {
    for entry in entries {
        writeln!(writer, "{}", entry.full_text)?;
    }
    writer.flush()?;
    Ok(entries.len())
}
