// LogStudio - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogStudio";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogStudio";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing
// =============================================================================

/// Level assigned when the level capture group matched but was empty.
pub const DEFAULT_LEVEL: &str = "INFO";

/// Level assigned to standalone lines that never matched the schema.
pub const UNKNOWN_LEVEL: &str = "UNKNOWN";

/// Separator between namespace segments.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Maximum regex pattern length accepted in a schema.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

/// Built-in line pattern: `timestamp | LEVEL | Name.Space | message`,
/// tolerant of extra whitespace around the pipes.
pub const DEFAULT_SCHEMA_PATTERN: &str =
    r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d+)\s*\|\s*([A-Z]+)\s*\|\s*([^|]+)\s*\|\s*(.+)$";

/// Display hint for the built-in schema's timestamp column.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "YYYY-MM-DD HH:mm:ss.SSS";

/// Display separator for the built-in schema.
pub const DEFAULT_SEPARATOR: &str = " | ";

// =============================================================================
// Display
// =============================================================================

/// Messages longer than this many characters are collapsed in previews.
pub const PREVIEW_MAX_CHARS: usize = 150;

/// Suffix appended to collapsed previews.
pub const PREVIEW_ELLIPSIS: &str = " ...";

// =============================================================================
// File I/O
// =============================================================================

/// File size threshold in bytes above which reads use a memory map.
pub const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

/// Default include glob patterns for log file listing.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.log"];

/// Retry limits for transient I/O errors.
pub const MAX_READ_RETRIES: u32 = 3;
pub const READ_RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// File watching
// =============================================================================

/// Default interval between file-change polls (ms).
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Minimum user-configurable refresh interval (ms).
pub const MIN_REFRESH_INTERVAL_MS: u64 = 100;

/// Maximum user-configurable refresh interval (ms).
pub const MAX_REFRESH_INTERVAL_MS: u64 = 60_000;

/// How often the cancel flag is checked within each poll sleep (ms).
pub const WATCH_CANCEL_CHECK_INTERVAL_MS: u64 = 50;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Persisted settings file name (stored in the platform data directory).
pub const SETTINGS_FILE_NAME: &str = "settings.json";
