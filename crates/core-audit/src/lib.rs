//! Audit trail and remote telemetry for QueryDesk lookups
//!
//! Every completed lookup attempt becomes one immutable [`QueryEvent`]. The
//! event is written to a bounded local [`AuditLogStore`] and, independently,
//! mirrored to a remote monitoring channel by the [`TelemetryRelay`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        completed lookup             │
//! └──────────────┬──────────────────────┘
//!                │ QueryEvent
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌──────────────┐ ┌──────────────────┐
//! │ AuditLogStore│ │  TelemetryRelay  │
//! │  append      │ │  format (≤4096)  │
//! │  list        │ │  spawn dispatch  │
//! │  purge       │ └────────┬─────────┘
//! └──────┬───────┘          │ POST
//!        ▼                  ▼
//! ┌──────────────┐ ┌──────────────────┐
//! │ KeyValueStore│ │  TelemetrySink   │
//! └──────────────┘ └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use querydesk_core_audit::{AuditLogStore, FileKeyValueStore, QueryEvent};
//!
//! let medium = Arc::new(FileKeyValueStore::new("/tmp/querydesk").unwrap());
//! let store = AuditLogStore::new(medium);
//!
//! store.append(QueryEvent::from_failure("923001234567", "timeout")).unwrap();
//! assert_eq!(store.list().len(), 1);
//! ```

pub mod error;
pub mod event;
pub mod record;
pub mod relay;
pub mod storage;
pub mod store;

// Re-export main types
pub use error::{Error, Result};
pub use event::QueryEvent;
pub use record::{LookupRecord, LookupResponse};
pub use relay::{
    format_message, ClientContext, HttpTelemetrySink, TelemetryPayload, TelemetryRelay,
    TelemetrySink, MAX_MESSAGE_CHARS, MAX_RELAYED_RECORDS,
};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use store::{AuditLogStore, AUDIT_LOG_CAPACITY, AUDIT_LOG_KEY};
