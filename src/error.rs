/*!
 * Error types for QueryDesk
 */

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryDeskError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 2;
pub const EXIT_STORAGE: i32 = 3;

#[derive(Debug, Error)]
pub enum QueryDeskError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    /// Lookup endpoint unreachable or answered with a non-success status
    #[error("{0}")]
    Lookup(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Audit trail or telemetry error
    #[error("Audit error: {0}")]
    Audit(#[from] querydesk_core_audit::Error),

    /// Interactive prompt failed (terminal closed, not a tty, ...)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// PIN did not match the configured secret
    #[error("ACCESS DENIED: Invalid Security Clearance")]
    AccessDenied,
}

impl QueryDeskError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            QueryDeskError::Audit(e) if e.is_persistence() => EXIT_STORAGE,
            _ => EXIT_FATAL,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            QueryDeskError::Config(_) | QueryDeskError::ConfigFile { .. } => {
                ErrorCategory::Configuration
            }
            QueryDeskError::Lookup(_) => ErrorCategory::Network,
            QueryDeskError::Io(_) => ErrorCategory::IoError,
            QueryDeskError::Audit(e) if e.is_persistence() => ErrorCategory::Storage,
            QueryDeskError::Audit(_) => ErrorCategory::Audit,
            QueryDeskError::Prompt(_) => ErrorCategory::Terminal,
            QueryDeskError::AccessDenied => ErrorCategory::Security,
        }
    }
}

impl From<reqwest::Error> for QueryDeskError {
    fn from(err: reqwest::Error) -> Self {
        QueryDeskError::Lookup(err.to_string())
    }
}

impl From<dialoguer::Error> for QueryDeskError {
    fn from(err: dialoguer::Error) -> Self {
        QueryDeskError::Prompt(err.to_string())
    }
}

/// Exit code for an error surfaced at the top level
///
/// Errors that did not originate as a [`QueryDeskError`] are fatal.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<QueryDeskError>()
        .map(QueryDeskError::exit_code)
        .unwrap_or(EXIT_FATAL)
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    IoError,
    Audit,
    Storage,
    Terminal,
    Security,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Audit => write!(f, "audit"),
            ErrorCategory::Storage => write!(f, "storage"),
            ErrorCategory::Terminal => write!(f, "terminal"),
            ErrorCategory::Security => write!(f, "security"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_display_is_verbatim() {
        let err = QueryDeskError::Lookup("Server returned 500 Internal Server Error".to_string());
        assert_eq!(err.to_string(), "Server returned 500 Internal Server Error");
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_access_denied_display() {
        let err = QueryDeskError::AccessDenied;
        assert!(err.to_string().starts_with("ACCESS DENIED"));
        assert_eq!(err.category(), ErrorCategory::Security);
    }

    #[test]
    fn test_audit_error_conversion() {
        let err: QueryDeskError =
            querydesk_core_audit::Error::Timeout(std::time::Duration::from_secs(10)).into();
        assert_eq!(err.category(), ErrorCategory::Audit);
        assert_eq!(err.exit_code(), EXIT_FATAL);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_config_file_error() {
        let err = QueryDeskError::ConfigFile {
            path: PathBuf::from("/etc/querydesk.toml"),
            reason: "expected `=`".to_string(),
        };
        assert!(err.to_string().contains("/etc/querydesk.toml"));
        assert_eq!(err.exit_code(), EXIT_FATAL);
    }

    #[test]
    fn test_persistence_failure_maps_to_storage_exit() {
        let err: QueryDeskError =
            querydesk_core_audit::Error::storage("/data/querydesk", "read-only file system").into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.exit_code(), EXIT_STORAGE);
    }

    #[test]
    fn test_exit_code_for_top_level_errors() {
        let err = anyhow::Error::from(QueryDeskError::Audit(querydesk_core_audit::Error::storage(
            "/data", "denied",
        )));
        assert_eq!(exit_code_for(&err), EXIT_STORAGE);

        let err = anyhow::Error::from(QueryDeskError::Config("bad".into()))
            .context("Failed to start QueryDesk");
        assert_eq!(exit_code_for(&err), EXIT_FATAL);

        let err = anyhow::anyhow!("runtime unavailable");
        assert_eq!(exit_code_for(&err), EXIT_FATAL);
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
        assert_eq!(ErrorCategory::Security.to_string(), "security");
        assert_eq!(ErrorCategory::Storage.to_string(), "storage");
    }
}
