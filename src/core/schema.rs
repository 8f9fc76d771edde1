// LogStudio - core/schema.rs
//
// Log schema definition, validation, and compilation.
// Core layer: accepts definitions from config/settings, never touches the
// filesystem. A schema is validated once, up front; parsing never fails.

use crate::util::constants;
use crate::util::error::SchemaError;
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Raw definition (as stored in config.toml / settings.json)
// =============================================================================

/// Capture-group indices (1-based) for each extracted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub timestamp: usize,
    pub level: usize,
    pub namespace: usize,
    pub message: usize,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            timestamp: 1,
            level: 2,
            namespace: 3,
            message: 4,
        }
    }
}

impl FieldMap {
    fn named(&self) -> [(&'static str, usize); 4] {
        [
            ("fields.timestamp", self.timestamp),
            ("fields.level", self.level),
            ("fields.namespace", self.namespace),
            ("fields.message", self.message),
        ]
    }
}

/// Uncompiled schema: regex source plus field mapping.
///
/// `timestamp_format` and `separator` are display hints only; the parser
/// keeps timestamps as captured text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub pattern: String,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub fields: FieldMap,
}

fn default_timestamp_format() -> String {
    constants::DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_separator() -> String {
    constants::DEFAULT_SEPARATOR.to_string()
}

impl Default for SchemaDefinition {
    fn default() -> Self {
        Self {
            pattern: constants::DEFAULT_SCHEMA_PATTERN.to_string(),
            timestamp_format: default_timestamp_format(),
            separator: default_separator(),
            fields: FieldMap::default(),
        }
    }
}

// =============================================================================
// Compiled schema (runtime representation)
// =============================================================================

/// A validated schema with its compiled regex. Immutable; replacing it on a
/// source invalidates every entry parsed with the previous one.
#[derive(Debug, Clone)]
pub struct LogSchema {
    definition: SchemaDefinition,
    regex: Regex,
}

impl LogSchema {
    /// The built-in pipe-delimited schema.
    pub fn builtin() -> Self {
        // The default pattern is a compile-time constant exercised by the
        // unit tests below, so a failure here is a programming error.
        #[allow(clippy::expect_used)]
        compile(SchemaDefinition::default()).expect("built-in schema must compile")
    }

    pub fn definition(&self) -> &SchemaDefinition {
        &self.definition
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn fields(&self) -> FieldMap {
        self.definition.fields
    }

    /// True if both schemas would parse any content identically.
    /// Display hints are ignored.
    pub fn same_definition(&self, other: &LogSchema) -> bool {
        self.definition.pattern == other.definition.pattern
            && self.definition.fields == other.definition.fields
    }
}

/// Validate a `SchemaDefinition` and compile it into a `LogSchema`.
///
/// Validates:
/// - the pattern is non-empty and within the length limit
/// - the pattern compiles
/// - every field index is >= 1 and no larger than the number of capture groups
pub fn compile(def: SchemaDefinition) -> Result<LogSchema, SchemaError> {
    if def.pattern.is_empty() {
        return Err(SchemaError::MissingField { field: "pattern" });
    }

    let regex = compile_regex(&def.pattern)?;

    // captures_len() counts the implicit whole-match group 0.
    let group_count = regex.captures_len().saturating_sub(1);

    for (field, index) in def.fields.named() {
        if index == 0 {
            return Err(SchemaError::ZeroFieldIndex { field });
        }
        if index > group_count {
            return Err(SchemaError::FieldIndexOutOfRange {
                field,
                index,
                group_count,
            });
        }
    }

    tracing::debug!(
        pattern = %def.pattern,
        groups = group_count,
        "Schema compiled"
    );

    Ok(LogSchema {
        definition: def,
        regex,
    })
}

/// Compile a regex pattern with length validation to prevent ReDoS.
fn compile_regex(pattern: &str) -> Result<Regex, SchemaError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(SchemaError::RegexTooLong {
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    Regex::new(pattern).map_err(|e| SchemaError::InvalidRegex {
        pattern: pattern.to_string(),
        source: e,
    })
}
