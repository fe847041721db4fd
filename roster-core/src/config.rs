//! Configuration management
//!
//! Settings live in `settings.json` inside the roster directory:
//! ```json
//! {
//!   "server": { "bindAddress": "127.0.0.1:8000", "maxUploadBytes": 10485760 },
//!   "logging": { "level": "info", "format": "pretty" }
//! }
//! ```
//! Keys this crate does not know about are kept when saving.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    server: ServerSettings,
    #[serde(default)]
    logging: LoggingSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bind_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_upload_bytes: Option<usize>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoggingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<LogFormat>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// JSON lines
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" | "jsonl" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Largest accepted request body, CSV uploads included
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `roster_core=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Roster configuration (resolved view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from the roster directory
    ///
    /// A missing or unreadable settings file yields defaults. Environment
    /// variables override the file:
    /// - `ROSTER_BIND_ADDRESS`
    /// - `ROSTER_LOG_LEVEL`
    /// - `ROSTER_LOG_FORMAT` (`pretty` or `json`)
    pub fn load(roster_dir: &Path) -> Result<Self> {
        let raw = read_settings(roster_dir)?;
        let mut config = Self::from_settings(&raw);
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_settings(raw: &SettingsFile) -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                bind_address: raw
                    .server
                    .bind_address
                    .clone()
                    .unwrap_or(defaults.server.bind_address),
                max_upload_bytes: raw
                    .server
                    .max_upload_bytes
                    .unwrap_or(defaults.server.max_upload_bytes),
            },
            logging: LoggingConfig {
                level: raw.logging.level.clone().unwrap_or(defaults.logging.level),
                format: raw.logging.format.unwrap_or(defaults.logging.format),
            },
        }
    }

    fn apply_env_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("ROSTER_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(level) = var("ROSTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("ROSTER_LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&format).ok_or_else(|| {
                Error::Config(format!("unknown log format '{}'", format))
            })?;
        }
        Ok(())
    }

    /// Save config to the roster directory
    ///
    /// Preserves settings this crate doesn't manage
    pub fn save(&self, roster_dir: &Path) -> Result<()> {
        let mut settings = read_settings(roster_dir)?;

        settings.server.bind_address = Some(self.server.bind_address.clone());
        settings.server.max_upload_bytes = Some(self.server.max_upload_bytes);
        settings.logging.level = Some(self.logging.level.clone());
        settings.logging.format = Some(self.logging.format);

        std::fs::create_dir_all(roster_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(roster_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

fn read_settings(roster_dir: &Path) -> Result<SettingsFile> {
    let settings_path = roster_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let raw = read_settings(dir.path()).unwrap();
        let config = Config::from_settings(&raw);

        assert_eq!(config.server.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_reads_settings_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"server": {"bindAddress": "0.0.0.0:9000"}, "logging": {"format": "json"}}"#,
        )
        .unwrap();

        let config = Config::from_settings(&read_settings(dir.path()).unwrap());
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_malformed_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();

        let config = Config::from_settings(&read_settings(dir.path()).unwrap());
        assert_eq!(config.server.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| match key {
                "ROSTER_BIND_ADDRESS" => Some("127.0.0.1:1234".to_string()),
                "ROSTER_LOG_FORMAT" => Some("JSON".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:1234");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_log_format_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|key| (key == "ROSTER_LOG_FORMAT").then(|| "xml".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme": "dark", "server": {"tls": false}}"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.server.bind_address = "127.0.0.1:8080".to_string();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["server"]["tls"], false);
        assert_eq!(saved["server"]["bindAddress"], "127.0.0.1:8080");
        assert_eq!(saved["logging"]["format"], "pretty");
    }
}
