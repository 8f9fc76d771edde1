// LogStudio - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Malformed log lines are never errors: they degrade to UNKNOWN entries in
// the parser. Everything here is a configuration or I/O failure.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogStudio operations.
#[derive(Debug)]
pub enum LogStudioError {
    /// Schema validation or compilation failed.
    Schema(SchemaError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Export operation failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogStudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "Schema error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogStudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

/// Errors raised while validating and compiling a log schema.
///
/// These are configuration errors: they are surfaced before any parse
/// begins, never per line.
#[derive(Debug)]
pub enum SchemaError {
    /// A required field is empty.
    MissingField { field: &'static str },

    /// The pattern is not a valid regular expression.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// The pattern exceeds the maximum allowed length.
    RegexTooLong { length: usize, max_length: usize },

    /// A field mapping uses index 0 (the whole match), which is not a group.
    ZeroFieldIndex { field: &'static str },

    /// A field mapping points past the last capture group of the pattern.
    FieldIndexOutOfRange {
        field: &'static str,
        index: usize,
        group_count: usize,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing required field '{field}'"),
            Self::InvalidRegex { pattern, source } => {
                write!(f, "invalid regex '{pattern}': {source}")
            }
            Self::RegexTooLong { length, max_length } => write!(
                f,
                "pattern is {length} chars, exceeds maximum of {max_length}"
            ),
            Self::ZeroFieldIndex { field } => write!(
                f,
                "field '{field}' uses group index 0; capture groups are numbered from 1"
            ),
            Self::FieldIndexOutOfRange {
                field,
                index,
                group_count,
            } => write!(
                f,
                "field '{field}' refers to group {index}, but the pattern only has \
                 {group_count} capture group(s)"
            ),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SchemaError> for LogStudioError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Problems found while loading config.toml or saved settings.
///
/// Most of these are non-fatal: the loader collects them, falls back to the
/// default for the affected value and carries on. Only an explicitly named
/// config file that cannot be read or parsed is fatal.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The config file is not valid TOML for the expected shape.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A schema definition failed to compile. `origin` names where it came
    /// from (`[schema]` or saved settings).
    InvalidSchema {
        origin: &'static str,
        source: SchemaError,
    },

    /// A value is outside its allowed set or range.
    ValueOutOfRange {
        field: &'static str,
        value: String,
        expected: String,
    },

    /// An include pattern is not a valid glob.
    InvalidGlob {
        pattern: String,
        source: glob::PatternError,
    },

    /// Every include pattern was rejected.
    NoValidPatterns,

    /// No files were given and no log directory is configured.
    NoLogDirectory,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "could not read config file '{}': {source}", path.display())
            }
            Self::TomlParse { path, source } => {
                write!(f, "failed to parse config file '{}': {source}", path.display())
            }
            Self::InvalidSchema { origin, source } => {
                write!(f, "{origin} is invalid: {source}")
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{field} = {value} is out of range (expected {expected})"),
            Self::InvalidGlob { pattern, source } => {
                write!(f, "include pattern \"{pattern}\" is not a valid glob: {source}")
            }
            Self::NoValidPatterns => write!(
                f,
                "include_patterns has no valid entries (default: {})",
                crate::util::constants::DEFAULT_INCLUDE_PATTERNS.join(", ")
            ),
            Self::NoLogDirectory => write!(
                f,
                "no log files given and [viewer] log_directory is not set; \
                 pass FILES or --dir DIR"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidSchema { source, .. } => Some(source),
            Self::InvalidGlob { source, .. } => Some(source),
            Self::ValueOutOfRange { .. } | Self::NoValidPatterns | Self::NoLogDirectory => None,
        }
    }
}

impl From<ConfigError> for LogStudioError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export.
    Io(io::Error),

    /// CSV serialisation error.
    Csv(csv::Error),

    /// JSON serialisation error.
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(source) => write!(f, "export I/O error: {source}"),
            Self::Csv(source) => write!(f, "CSV export error: {source}"),
            Self::Json(source) => write!(f, "JSON export error: {source}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(source) => Some(source),
            Self::Csv(source) => Some(source),
            Self::Json(source) => Some(source),
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ExportError> for LogStudioError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for LogStudio results.
pub type Result<T> = std::result::Result<T, LogStudioError>;
