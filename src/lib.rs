/*!
 * QueryDesk - interactive subscriber lookup terminal
 *
 * - Lookup client for an external record service
 * - Search state machine that records every completed attempt
 * - Bounded, persisted audit log (via `querydesk-core-audit`)
 * - Fire-and-forget telemetry relay to a remote channel
 * - PIN-gated admin console to review or purge the audit log
 */

pub mod admin;
pub mod cli_style;
pub mod config;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod orchestrator;
pub mod terminal;
pub mod viewer;

// Re-export commonly used types
pub use admin::{AccessGate, AccessSession, AdminConsole};
pub use config::{AppConfig, LogLevel, LogTarget, TelemetryConfig, ADMIN_PIN};
pub use error::{QueryDeskError, Result};
pub use lookup::{HttpLookupClient, LookupClient};
pub use orchestrator::{QueryOrchestrator, SearchState};
pub use viewer::AuditLogViewer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
