// LogStudio - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::schema::{self, LogSchema, SchemaDefinition};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogStudio configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logstudio/ or %APPDATA%\LogStudio\config\)
    pub config_dir: PathBuf,

    /// Data directory for persisted settings.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(constants::SETTINGS_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are ignored so a newer config file still loads.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[schema]` section.
    pub schema: Option<SchemaDefinition>,
    /// `[viewer]` section.
    pub viewer: ViewerSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[viewer]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    /// Directory listed on startup when no files are given.
    pub log_directory: Option<String>,
    /// Reload the open file when it changes on disk.
    pub auto_refresh: Option<bool>,
    /// Watch poll interval in milliseconds.
    pub refresh_interval_ms: Option<u64>,
    /// Glob patterns selecting files in a listed directory.
    pub include_patterns: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration.
///
/// Built once at startup and passed explicitly to the components that need
/// it; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Schema --
    pub schema: LogSchema,

    // -- Viewer --
    pub log_directory: Option<PathBuf>,
    pub auto_refresh: bool,
    pub refresh_interval_ms: u64,
    pub include_patterns: Vec<String>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: LogSchema::builtin(),
            log_directory: None,
            auto_refresh: true,
            refresh_interval_ms: constants::DEFAULT_REFRESH_INTERVAL_MS,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<ConfigError>) {
    load_config_file(&config_dir.join(constants::CONFIG_FILE_NAME))
}

/// Load and validate a specific config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// problems. A missing file yields defaults with no warnings (first run). An
/// unreadable or unparseable file yields defaults plus a warning; the
/// application still starts but the user is told why their settings were
/// ignored.
pub fn load_config_file(config_path: &Path) -> (AppConfig, Vec<ConfigError>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_strict(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!(error = %e, "Config file ignored; using defaults");
            (AppConfig::default(), vec![e])
        }
    }
}

/// Load a config file the user named explicitly.
///
/// A missing, unreadable or unparseable file is an error here. Invalid
/// values inside a well-formed file are still only warnings.
pub fn load_config_strict(
    config_path: &Path,
) -> Result<(AppConfig, Vec<ConfigError>), ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let mut warnings = Vec::new();
    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    Ok((config, warnings))
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<ConfigError>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Schema --
    if let Some(def) = raw.schema {
        match schema::compile(def) {
            Ok(compiled) => config.schema = compiled,
            Err(source) => warnings.push(ConfigError::InvalidSchema {
                origin: "[schema]",
                source,
            }),
        }
    }

    // -- Viewer: log_directory --
    if let Some(dir) = raw.viewer.log_directory {
        if !dir.is_empty() {
            config.log_directory = Some(PathBuf::from(dir));
        }
    }

    // -- Viewer: auto_refresh --
    if let Some(auto) = raw.viewer.auto_refresh {
        config.auto_refresh = auto;
    }

    // -- Viewer: refresh_interval_ms --
    if let Some(ms) = raw.viewer.refresh_interval_ms {
        if (constants::MIN_REFRESH_INTERVAL_MS..=constants::MAX_REFRESH_INTERVAL_MS).contains(&ms) {
            config.refresh_interval_ms = ms;
        } else {
            warnings.push(refresh_interval_out_of_range("[viewer] refresh_interval_ms", ms));
        }
    }

    // -- Viewer: include_patterns --
    if let Some(patterns) = raw.viewer.include_patterns {
        let mut valid = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            match glob::Pattern::new(&pattern) {
                Ok(_) => valid.push(pattern),
                Err(source) => warnings.push(ConfigError::InvalidGlob { pattern, source }),
            }
        }
        if valid.is_empty() {
            warnings.push(ConfigError::NoValidPatterns);
        } else {
            config.include_patterns = valid;
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[logging] level",
                value: format!("\"{level}\""),
                expected: valid.join(", "),
            });
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    config
}

/// Warning for a refresh interval outside the allowed bounds.
pub(crate) fn refresh_interval_out_of_range(field: &'static str, ms: u64) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field,
        value: ms.to_string(),
        expected: format!(
            "{}-{} ms",
            constants::MIN_REFRESH_INTERVAL_MS,
            constants::MAX_REFRESH_INTERVAL_MS
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load_str(content: &str) -> (AppConfig, Vec<ConfigError>) {
        let dir = TempDir::new().expect("tmpdir");
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), content).expect("write");
        load_config(dir.path())
    }

    #[test]
    fn test_missing_file_gives_defaults_without_warnings() {
        let dir = TempDir::new().expect("tmpdir");
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert!(config.auto_refresh);
        assert_eq!(config.include_patterns, vec!["*.log".to_string()]);
        assert!(config.schema.same_definition(&LogSchema::builtin()));
    }

    #[test]
    fn test_valid_sections_are_applied() {
        let (config, warnings) = load_str(
            r#"
            [schema]
            pattern = '^(\S+) \[(\w+)\] (\S+): (.*)$'

            [viewer]
            log_directory = "/var/log/app"
            auto_refresh = false
            refresh_interval_ms = 250
            include_patterns = ["*.log", "*.txt"]

            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.schema.definition().pattern, r"^(\S+) \[(\w+)\] (\S+): (.*)$");
        assert_eq!(config.log_directory, Some(PathBuf::from("/var/log/app")));
        assert!(!config.auto_refresh);
        assert_eq!(config.refresh_interval_ms, 250);
        assert_eq!(config.include_patterns.len(), 2);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = load_str(
            r#"
            [viewer]
            refresh_interval_ms = 5
            include_patterns = ["["]

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(config.refresh_interval_ms, constants::DEFAULT_REFRESH_INTERVAL_MS);
        assert_eq!(config.include_patterns, vec!["*.log".to_string()]);
        assert!(config.log_level.is_none());
        assert!(matches!(
            warnings.as_slice(),
            [
                ConfigError::ValueOutOfRange { field: "[viewer] refresh_interval_ms", .. },
                ConfigError::InvalidGlob { .. },
                ConfigError::NoValidPatterns,
                ConfigError::ValueOutOfRange { field: "[logging] level", .. },
            ]
        ));
        assert!(warnings[0].to_string().contains("100-60000 ms"));
    }

    #[test]
    fn test_invalid_schema_falls_back_to_builtin() {
        let (config, warnings) = load_str(
            r#"
            [schema]
            pattern = '^(\w+) (.*)$'
            "#,
        );
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ConfigError::InvalidSchema { origin: "[schema]", .. }
        ));
        assert!(warnings[0].to_string().starts_with("[schema] is invalid"));
        assert!(config.schema.same_definition(&LogSchema::builtin()));
    }

    #[test]
    fn test_unparseable_file_warns() {
        let (config, warnings) = load_str("this is = = not toml");
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigError::TomlParse { .. }));
        assert!(config.auto_refresh);
    }

    #[test]
    fn test_strict_load_rejects_missing_and_malformed_files() {
        let dir = TempDir::new().expect("tmpdir");
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            load_config_strict(&missing),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[viewer\nauto_refresh = ").expect("write");
        assert!(matches!(
            load_config_strict(&broken),
            Err(ConfigError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_strict_load_keeps_value_warnings_non_fatal() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[viewer]\nrefresh_interval_ms = 1\nauto_refresh = false\n")
            .expect("write");
        let (config, warnings) = load_config_strict(&path).expect("well-formed file");
        assert!(!config.auto_refresh);
        assert_eq!(warnings.len(), 1);
    }
}
