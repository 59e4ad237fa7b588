/*!
 * Configuration types for QueryDesk
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{QueryDeskError, Result};

/// Admin console secret, fixed at build time
///
/// Set `QUERYDESK_ADMIN_PIN` when compiling to override the default.
pub const ADMIN_PIN: &str = match option_env!("QUERYDESK_ADMIN_PIN") {
    Some(pin) => pin,
    None => "0000",
};

/// Log file name used when no `log_file` is configured
pub const DEFAULT_LOG_FILE: &str = "querydesk.log";

/// Environment variable pointing at an alternate configuration file
pub const CONFIG_ENV_VAR: &str = "QUERYDESK_CONFIG";

/// Main runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lookup service endpoint; the query is sent as `?query=`
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,

    /// Lookup request timeout in seconds
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,

    /// Remote monitoring channel
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Directory holding the persisted audit log (None = platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = `querydesk.log` in the data dir)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Log to stderr instead of a file; diagnostics then share the prompt
    #[serde(default)]
    pub log_to_stderr: bool,
}

/// Where diagnostic output is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Remote telemetry relay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Webhook URL messages are posted to (None = relay disabled)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Destination channel identifier
    #[serde(default)]
    pub chat_id: String,

    /// Dispatch timeout in seconds
    #[serde(default = "default_telemetry_timeout")]
    pub timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            chat_id: String::new(),
            timeout_secs: default_telemetry_timeout(),
        }
    }
}

impl TelemetryConfig {
    /// The relay only runs with both an endpoint and a channel
    pub fn is_enabled(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.trim().is_empty())
            && !self.chat_id.trim().is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lookup_url: default_lookup_url(),
            lookup_timeout_secs: default_lookup_timeout(),
            telemetry: TelemetryConfig::default(),
            data_dir: None,
            log_level: LogLevel::default(),
            log_file: None,
            log_to_stderr: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_lookup_url() -> String {
    "http://127.0.0.1:8080/api/lookup".to_string()
}

fn default_lookup_timeout() -> u64 {
    30
}

fn default_telemetry_timeout() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| QueryDeskError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| QueryDeskError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| QueryDeskError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load from `$QUERYDESK_CONFIG`, then `~/.querydesk/querydesk.toml`
    ///
    /// Missing files fall back to defaults; a file that exists but cannot be
    /// parsed is an error.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Some(PathBuf::from(path)),
            None => default_config_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Directory the audit log is persisted in
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("querydesk")
        })
    }

    /// Diagnostic output destination
    ///
    /// The interactive prompt draws on the terminal, so logs go to a file
    /// unless stderr was asked for explicitly.
    pub fn log_target(&self) -> LogTarget {
        if self.log_to_stderr {
            return LogTarget::Stderr;
        }
        LogTarget::File(
            self.log_file
                .clone()
                .unwrap_or_else(|| self.resolved_data_dir().join(DEFAULT_LOG_FILE)),
        )
    }

    /// Validate values that serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.lookup_url.trim().is_empty() {
            return Err(QueryDeskError::Config("lookup_url must not be empty".into()));
        }
        if self.lookup_timeout_secs == 0 {
            return Err(QueryDeskError::Config(
                "lookup_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.telemetry.timeout_secs == 0 {
            return Err(QueryDeskError::Config(
                "telemetry.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// `~/.querydesk/querydesk.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".querydesk").join("querydesk.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.lookup_timeout_secs, 30);
        assert_eq!(config.telemetry.timeout_secs, 10);
        assert!(!config.telemetry.is_enabled());
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_admin_pin() {
        if option_env!("QUERYDESK_ADMIN_PIN").is_none() {
            assert_eq!(ADMIN_PIN, "0000");
        }
    }

    #[test]
    fn test_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            lookup_url = "https://lookup.example.net/api/lookup"
            log_level = "debug"

            [telemetry]
            endpoint = "https://hooks.example.net/bot123/sendMessage"
            chat_id = "42"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.lookup_url, "https://lookup.example.net/api/lookup");
        assert_eq!(config.lookup_timeout_secs, 30);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.telemetry.is_enabled());
        assert_eq!(config.telemetry.timeout_secs, 10);
    }

    #[test]
    fn test_telemetry_requires_chat_id() {
        let telemetry = TelemetryConfig {
            endpoint: Some("https://hooks.example.net".into()),
            chat_id: "  ".into(),
            timeout_secs: 5,
        };
        assert!(!telemetry.is_enabled());
    }

    #[test]
    fn test_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("querydesk.toml");

        let mut config = AppConfig::default();
        config.data_dir = Some(temp.path().join("data"));
        config.to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.resolved_data_dir(), temp.path().join("data"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "lookup_url = ").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(QueryDeskError::ConfigFile { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AppConfig {
            lookup_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logs_default_to_file_in_data_dir() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/var/lib/querydesk")),
            ..Default::default()
        };
        assert_eq!(
            config.log_target(),
            LogTarget::File(PathBuf::from("/var/lib/querydesk").join(DEFAULT_LOG_FILE))
        );
    }

    #[test]
    fn test_log_target_honours_explicit_settings() {
        let mut config = AppConfig {
            log_file: Some(PathBuf::from("/tmp/qd.log")),
            ..Default::default()
        };
        assert_eq!(config.log_target(), LogTarget::File(PathBuf::from("/tmp/qd.log")));

        config.log_to_stderr = true;
        assert_eq!(config.log_target(), LogTarget::Stderr);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
    }
}
