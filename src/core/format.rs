// LogStudio - core/format.rs
//
// Display helpers for a single entry: the collapsed one-row preview and the
// expanded detail text.
//
// The detail text is classified and reformatted in a fixed order:
//   1. Exception/stack trace -> header and "Caused by" lines marked with "==> ",
//                               stack frames re-indented
//   2. JSON                  -> whole text or first embedded object/array,
//                               pretty-printed with 2-space indentation
//   3. XML                   -> first tag span, one tag per line, indented
//   4. anything else         -> returned unchanged
//
// Core layer: pure string processing.

use crate::core::model::LogEntry;
use crate::util::constants;
use regex::Regex;
use std::sync::OnceLock;

/// Classification of an entry's detail text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Exception,
    Json,
    Xml,
    Text,
}

impl ContentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exception => "exception",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Text => "text",
        }
    }
}

/// Reformatted detail text plus its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedContent {
    pub kind: ContentKind,
    pub text: String,
}

// =============================================================================
// Row preview
// =============================================================================

/// True if the entry has more to show than its collapsed preview.
pub fn is_expandable(entry: &LogEntry) -> bool {
    entry.is_multi_line || entry.message.chars().count() > constants::PREVIEW_MAX_CHARS
}

/// Collapsed single-row text for an entry.
///
/// Multi-line entries show their first message line, long messages their
/// first `PREVIEW_MAX_CHARS` characters; both get the ellipsis suffix.
pub fn preview_message(entry: &LogEntry) -> String {
    if entry.is_multi_line {
        let first = entry.message.split('\n').next().unwrap_or_default();
        return format!("{first}{}", constants::PREVIEW_ELLIPSIS);
    }

    if entry.message.chars().count() > constants::PREVIEW_MAX_CHARS {
        let head: String = entry
            .message
            .chars()
            .take(constants::PREVIEW_MAX_CHARS)
            .collect();
        return format!("{head}{}", constants::PREVIEW_ELLIPSIS);
    }

    entry.message.clone()
}

/// Expanded detail text: the full record for multi-line entries, otherwise
/// the message.
pub fn detail_content(entry: &LogEntry) -> FormattedContent {
    if entry.is_multi_line {
        analyze_content(&entry.full_text)
    } else {
        analyze_content(&entry.message)
    }
}

// =============================================================================
// Content analysis
// =============================================================================

/// Classify `text` and return it reformatted for display.
pub fn analyze_content(text: &str) -> FormattedContent {
    if let Some(formatted) = format_exception(text) {
        return FormattedContent {
            kind: ContentKind::Exception,
            text: formatted,
        };
    }

    if let Some(formatted) = format_json(text) {
        return FormattedContent {
            kind: ContentKind::Json,
            text: formatted,
        };
    }

    if let Some(formatted) = format_xml(text) {
        return FormattedContent {
            kind: ContentKind::Xml,
            text: formatted,
        };
    }

    FormattedContent {
        kind: ContentKind::Text,
        text: text.to_string(),
    }
}

struct Patterns {
    exception_detect: Vec<Regex>,
    exception_header: Regex,
    caused_by: Regex,
    stack_frame: Regex,
    json_object: Regex,
    json_array: Regex,
    xml_span: Regex,
    xml_between_tags: Regex,
    xml_open_tag: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        // All patterns are literals covered by the unit tests below.
        #[allow(clippy::expect_used)]
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("format: invalid regex")
        }

        Patterns {
            exception_detect: vec![
                re(r"(?i)(?:exception|error)\s*:\s*\S"),
                re(r"(?i)at\s+[\w.<>$]+\([^)]*\)"),
                re(r"(?i)\s+at\s+.+?\(.+?:\d+\)"),
                re(r"(?i)caused by:\s*\S"),
            ],
            exception_header: re(r"(?i)[\w.$]*\w(?:exception|error)\s*:\s*\S"),
            caused_by: re(r"(?i)^\s*caused by:\s*(.+)$"),
            stack_frame: re(r"(?i)^\s*at\s+([\w.<>$]+)\(([^)]*)\)(.*)$"),
            json_object: re(r"\{(?:[^{}]|\{[^{}]*\})*\}"),
            json_array: re(r"(?s)\[.*?\]"),
            xml_span: re(r"(?s)<[A-Za-z?!/].*>"),
            xml_between_tags: re(r">\s*<"),
            xml_open_tag: re(r"^<[A-Za-z_][^>]*>"),
        }
    })
}

/// Exception/stack-trace formatting. `None` if no exception marker is found.
fn format_exception(text: &str) -> Option<String> {
    let p = patterns();
    if !p.exception_detect.iter().any(|re| re.is_match(text)) {
        return None;
    }

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            let line = line.trim_end_matches('\r');
            if let Some(caps) = p.caused_by.captures(line) {
                return format!("==> Caused by: {}", caps[1].trim());
            }
            if let Some(caps) = p.stack_frame.captures(line) {
                return format!("    at {}({}){}", &caps[1], &caps[2], &caps[3]);
            }
            if p.exception_header.is_match(line) {
                return format!("==> {}", line.trim());
            }
            line.to_string()
        })
        .collect();

    Some(lines.join("\n"))
}

/// JSON pretty-printing. `None` if no parseable JSON is found.
fn format_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let looks_whole = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));

    let candidate = if looks_whole {
        trimmed
    } else {
        let p = patterns();
        p.json_object
            .find(text)
            .or_else(|| p.json_array.find(text))?
            .as_str()
    };

    let value: serde_json::Value = serde_json::from_str(candidate).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Rough XML indentation. `None` if the text has no tag-like span.
fn format_xml(text: &str) -> Option<String> {
    let p = patterns();
    let span = p.xml_span.find(text)?.as_str();
    let split = p.xml_between_tags.replace_all(span, ">\n<");

    let mut depth: usize = 0;
    let mut out = Vec::new();
    for line in split.split('\n') {
        let line = line.trim();
        if line.starts_with("</") {
            depth = depth.saturating_sub(1);
        }
        out.push(format!("{}{}", "  ".repeat(depth), line));

        let opens = p.xml_open_tag.is_match(line) && !line.ends_with("/>") && !line.contains("</");
        if opens {
            depth += 1;
        }
    }

    Some(out.join("\n"))
}

// =============================================================================
// Unit tests
// =============================================================================
