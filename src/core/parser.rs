// LogStudio - core/parser.rs
//
// Schema-driven line parsing with multi-line continuation.
// Core layer: accepts content as a string; the app layer handles reading.
//
// The parser is a two-state machine:
//
//   Idle ──header──▶ Accumulating(entry)
//   Accumulating ──header──▶ emit entry, Accumulating(new)
//   Accumulating ──other line──▶ Accumulating(entry + continuation)
//   Idle ──non-blank, non-header──▶ emit UNKNOWN entry, stay Idle
//   Idle ──blank──▶ Idle
//
// A "header" is a line whose trimmed text matches the schema regex.

use crate::core::model::LogEntry;
use crate::core::schema::LogSchema;
use crate::util::constants;

// =============================================================================
// State machine
// =============================================================================

/// Parser accumulator state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParserState {
    /// No record is open; non-matching lines stand alone.
    #[default]
    Idle,

    /// A record is open and absorbs non-matching lines as continuations.
    Accumulating(LogEntry),
}

/// Incremental line-at-a-time parser.
///
/// `parse_content` drives this over a whole buffer; it is exposed so the
/// continuation rules can be exercised one line at a time.
#[derive(Debug)]
pub struct LineParser<'s> {
    schema: &'s LogSchema,
    state: ParserState,
    entries: Vec<LogEntry>,
}

impl<'s> LineParser<'s> {
    pub fn new(schema: &'s LogSchema) -> Self {
        Self {
            schema,
            state: ParserState::Idle,
            entries: Vec::new(),
        }
    }

    /// Current accumulator state.
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Entries completed so far (excludes the open record, if any).
    pub fn completed(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Feed one physical line (without its trailing `\n`).
    /// `line_number` is the absolute 1-based line number.
    pub fn push_line(&mut self, line: &str, line_number: u64) {
        if let Some(header) = self.match_header(line, line_number) {
            if let ParserState::Accumulating(done) =
                std::mem::replace(&mut self.state, ParserState::Accumulating(header))
            {
                self.entries.push(done);
            }
            return;
        }

        match &mut self.state {
            ParserState::Accumulating(entry) => append_continuation(entry, line),
            ParserState::Idle => {
                // Blank lines outside a record separate nothing and are dropped.
                if !line.trim().is_empty() {
                    self.entries.push(LogEntry::unknown(line_number, line));
                }
            }
        }
    }

    /// Close any open record and return all entries in input order.
    pub fn finish(mut self) -> Vec<LogEntry> {
        if let ParserState::Accumulating(open) = self.state {
            self.entries.push(open);
        }
        self.entries
    }

    /// Test the trimmed line against the schema and build a fresh entry on match.
    fn match_header(&self, line: &str, line_number: u64) -> Option<LogEntry> {
        let caps = self.schema.regex().captures(line.trim())?;
        let fields = self.schema.fields();
        let group = |idx: usize| caps.get(idx).map(|m| m.as_str().trim()).unwrap_or("");

        let level = match group(fields.level) {
            "" => constants::DEFAULT_LEVEL.to_string(),
            raw => raw.to_uppercase(),
        };

        Some(LogEntry {
            original_line_number: line_number,
            timestamp: group(fields.timestamp).to_string(),
            level,
            namespace: group(fields.namespace).to_string(),
            message: group(fields.message).to_string(),
            full_text: line.to_string(),
            is_multi_line: false,
            line_count: 1,
            source_file: None,
        })
    }
}

/// Fold a non-matching line into the open record.
///
/// `full_text` keeps the line verbatim (blank lines included) so stack traces
/// render as written; `message` gets a bare newline for blank lines.
fn append_continuation(entry: &mut LogEntry, line: &str) {
    entry.full_text.push('\n');
    entry.full_text.push_str(line);

    entry.message.push('\n');
    if !line.trim().is_empty() {
        entry.message.push_str(line);
    }

    entry.is_multi_line = true;
    entry.line_count += 1;
}

// =============================================================================
// Public entry points
// =============================================================================

/// Parse raw content into ordered log entries.
///
/// `line_offset` is the number of physical lines preceding `content` in its
/// source; entry line numbers are `index + line_offset + 1`. Parsing a suffix
/// with the right offset yields the same entries as parsing the whole file
/// and taking the tail, provided no record spans the split point.
pub fn parse_content(content: &str, schema: &LogSchema, line_offset: u64) -> Vec<LogEntry> {
    let mut parser = LineParser::new(schema);
    let mut lines: u64 = 0;

    for (idx, line) in content.split('\n').enumerate() {
        parser.push_line(line, idx as u64 + line_offset + 1);
        lines += 1;
    }

    let entries = parser.finish();

    tracing::debug!(
        entries = entries.len(),
        lines,
        line_offset,
        "Parsing complete"
    );

    entries
}

/// Number of newline-terminated lines in `prefix`.
pub fn count_complete_lines(prefix: &str) -> u64 {
    prefix.bytes().filter(|&b| b == b'\n').count() as u64
}

// =============================================================================
// Unit tests
// =============================================================================
