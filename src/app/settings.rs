// LogStudio - app/settings.rs
//
// Persisted user settings: the last-used schema, log directory and refresh
// behaviour, restored on the next start.
//
// - Saved atomically (write temp, rename) so a crash mid-save never corrupts
//   the previous good file.
// - Missing fields take their defaults, so a partial file still loads.
// - Unreadable, malformed or version-mismatched files load as `None`; the
//   caller starts from config.toml values instead.

use crate::core::schema::{self, SchemaDefinition};
use crate::platform::config::{refresh_interval_out_of_range, AppConfig};
use crate::util::constants;
use crate::util::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version stamp. Increment on breaking changes to `AppSettings`.
pub const SETTINGS_VERSION: u32 = 1;

fn current_version() -> u32 {
    SETTINGS_VERSION
}

/// On-disk settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "current_version")]
    pub version: u32,
    pub log_schema: SchemaDefinition,
    /// Empty = none.
    pub log_directory: String,
    pub auto_refresh: bool,
    /// Milliseconds.
    pub refresh_interval: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            log_schema: SchemaDefinition::default(),
            log_directory: String::new(),
            auto_refresh: true,
            refresh_interval: constants::DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl AppSettings {
    /// Snapshot the settings-relevant part of a config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            version: SETTINGS_VERSION,
            log_schema: config.schema.definition().clone(),
            log_directory: config
                .log_directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            auto_refresh: config.auto_refresh,
            refresh_interval: config.refresh_interval_ms,
        }
    }

    /// Overlay these settings on `base`, returning the new config plus
    /// warnings for values that could not be applied. Rejected values keep
    /// the `base` value.
    pub fn apply_to(&self, base: &AppConfig) -> (AppConfig, Vec<ConfigError>) {
        let mut config = base.clone();
        let mut warnings = Vec::new();

        match schema::compile(self.log_schema.clone()) {
            Ok(compiled) => config.schema = compiled,
            Err(source) => warnings.push(ConfigError::InvalidSchema {
                origin: "saved schema",
                source,
            }),
        }

        if !self.log_directory.is_empty() {
            config.log_directory = Some(PathBuf::from(&self.log_directory));
        }

        config.auto_refresh = self.auto_refresh;

        if (constants::MIN_REFRESH_INTERVAL_MS..=constants::MAX_REFRESH_INTERVAL_MS)
            .contains(&self.refresh_interval)
        {
            config.refresh_interval_ms = self.refresh_interval;
        } else {
            warnings.push(refresh_interval_out_of_range(
                "saved refreshInterval",
                self.refresh_interval,
            ));
        }

        (config, warnings)
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Where settings live.
pub trait SettingsStore {
    /// Load saved settings; `None` means "start fresh".
    fn load(&self) -> Option<AppSettings>;

    /// Persist settings. The error string is suitable for a warn! line.
    fn save(&self, settings: &AppSettings) -> Result<(), String>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Option<AppSettings> {
        let path = &self.path;
        let content = std::fs::read_to_string(path)
            .map_err(|e| {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(
                        path = %path.display(),
                        error = %e,
                        "Cannot read settings file"
                    );
                }
            })
            .ok()?;

        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Settings file is malformed, ignoring it"
                );
            })
            .ok()?;

        if settings.version != SETTINGS_VERSION {
            tracing::warn!(
                found = settings.version,
                expected = SETTINGS_VERSION,
                "Settings file version mismatch, ignoring it"
            );
            return None;
        }

        tracing::info!(path = %path.display(), "Settings loaded");
        Some(settings)
    }

    fn save(&self, settings: &AppSettings) -> Result<(), String> {
        let path = &self.path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                format!(
                    "cannot create settings directory '{}': {e}",
                    parent.display()
                )
            })?;
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("failed to serialise settings: {e}"))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes()).map_err(|e| {
            format!("failed to write settings temp file '{}': {e}", tmp.display())
        })?;

        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            format!("failed to finalise settings file '{}': {e}", path.display())
        })?;

        tracing::debug!(path = %path.display(), "Settings saved");
        Ok(())
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("nested").join("settings.json"));
        let settings = AppSettings {
            log_directory: "/var/log/app".to_string(),
            auto_refresh: false,
            refresh_interval: 500,
            ..Default::default()
        };

        store.save(&settings).expect("save should succeed");
        assert_eq!(store.load(), Some(settings));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"logDirectory": "/custom/path"}"#).unwrap();

        let loaded = JsonSettingsStore::new(&path).load().unwrap();
        assert_eq!(loaded.log_directory, "/custom/path");
        assert!(loaded.auto_refresh);
        assert_eq!(loaded.refresh_interval, constants::DEFAULT_REFRESH_INTERVAL_MS);
        assert_eq!(loaded.log_schema, SchemaDefinition::default());
    }

    #[test]
    fn test_malformed_or_wrong_version_loads_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        std::fs::write(&path, "invalid-json").unwrap();
        assert!(JsonSettingsStore::new(&path).load().is_none());

        std::fs::write(&path, r#"{"version": 99}"#).unwrap();
        assert!(JsonSettingsStore::new(&path).load().is_none());
    }

    #[test]
    fn test_apply_to_overrides_config() {
        let base = AppConfig::default();
        let settings = AppSettings {
            log_directory: "/srv/logs".to_string(),
            refresh_interval: 5,
            ..Default::default()
        };
        let (config, warnings) = settings.apply_to(&base);
        assert_eq!(config.log_directory, Some(PathBuf::from("/srv/logs")));
        assert_eq!(config.refresh_interval_ms, base.refresh_interval_ms);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ConfigError::ValueOutOfRange { field: "saved refreshInterval", .. }
        ));
    }

    #[test]
    fn test_invalid_saved_schema_keeps_current() {
        let settings = AppSettings {
            log_schema: SchemaDefinition {
                pattern: "(broken".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let (config, warnings) = settings.apply_to(&AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ConfigError::InvalidSchema { origin: "saved schema", .. }
        ));
        assert_eq!(
            config.schema.definition().pattern,
            constants::DEFAULT_SCHEMA_PATTERN
        );
    }
}
