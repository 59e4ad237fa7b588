//! Error types for audit operations

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while persisting or relaying audit events
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The persistent medium could not be read or written
    #[error("Storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    /// The stored log exists but is not a valid event sequence
    #[error("Corrupted audit log under key '{key}': {reason}")]
    Corrupted { key: String, reason: String },

    /// HTTP transport failure while dispatching telemetry
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("Remote endpoint rejected message ({status}): {body}")]
    RemoteRejected { status: u16, body: String },

    /// Dispatch did not complete within its deadline
    #[error("Dispatch timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Create a storage error
    pub fn storage<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Error::Storage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupted-log error
    pub fn corrupted<K: Into<String>, S: Into<String>>(key: K, reason: S) -> Self {
        Error::Corrupted {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a remote rejection error
    pub fn remote_rejected<S: Into<String>>(status: u16, body: S) -> Self {
        Error::RemoteRejected {
            status,
            body: body.into(),
        }
    }

    /// Whether this error came from the persistent medium rather than the network
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Json(_) | Error::Storage { .. } | Error::Corrupted { .. }
        )
    }
}
