/*!
 * Query orchestration
 *
 * Drives the search state machine:
 *
 * ```text
 * Idle ──submit──▶ Loading ──▶ Success(response)
 *   ▲                     └──▶ Failed(message)
 *   └──────────── reset ◀──────────┘
 * ```
 *
 * Every completed attempt produces exactly one [`QueryEvent`], handed to the
 * audit log store and the telemetry relay independently. Neither can change
 * the outcome the operator sees.
 */

use std::sync::{Arc, Mutex};

use querydesk_core_audit::{AuditLogStore, ClientContext, LookupResponse, QueryEvent, TelemetryRelay};
use tracing::{info, warn};

use crate::lookup::LookupClient;

/// Message shown when the service reports failure without explaining why
pub const DEFAULT_FAILURE_MESSAGE: &str = "API returned failure";

/// Visible state of the search panel
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Success(LookupResponse),
    Failed(String),
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading)
    }
}

#[derive(Debug, Default)]
struct Panel {
    query: String,
    state: SearchState,
}

/// Runs lookups and records every completed attempt
pub struct QueryOrchestrator {
    client: Arc<dyn LookupClient>,
    store: Arc<AuditLogStore>,
    relay: TelemetryRelay,
    context: ClientContext,
    panel: Mutex<Panel>,
}

impl QueryOrchestrator {
    pub fn new(
        client: Arc<dyn LookupClient>,
        store: Arc<AuditLogStore>,
        relay: TelemetryRelay,
        context: ClientContext,
    ) -> Self {
        Self {
            client,
            store,
            relay,
            context,
            panel: Mutex::new(Panel::default()),
        }
    }

    /// Current search state
    pub fn state(&self) -> SearchState {
        self.panel().state.clone()
    }

    /// Query text of the last submission
    pub fn query(&self) -> String {
        self.panel().query.clone()
    }

    /// Look up `text` and record the attempt
    ///
    /// Blank input is ignored and returns `None` without touching state or
    /// the audit log. Otherwise returns the terminal state of this attempt.
    /// Overlapping submissions are not cancelled; whichever finishes last
    /// owns the visible state.
    pub async fn submit_query(&self, text: &str) -> Option<SearchState> {
        if text.trim().is_empty() {
            return None;
        }

        {
            let mut panel = self.panel();
            panel.query = text.to_string();
            panel.state = SearchState::Loading;
        }

        let (state, event) = match self.client.lookup(text).await {
            Ok(response) => {
                let event = QueryEvent::from_response(text, &response);
                if response.success {
                    info!(results = response.count(), "Lookup succeeded");
                    (SearchState::Success(response), event)
                } else {
                    let message = response
                        .message
                        .clone()
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                    info!(%message, "Lookup reported failure");
                    (SearchState::Failed(message), event)
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(%message, "Lookup request failed");
                let event = QueryEvent::from_failure(text, &message);
                (SearchState::Failed(message), event)
            }
        };

        self.record(event);

        self.panel().state = state.clone();
        Some(state)
    }

    /// Clear the query and return to `Idle`; the audit log is untouched
    pub fn reset(&self) {
        let mut panel = self.panel();
        panel.query.clear();
        panel.state = SearchState::Idle;
    }

    fn record(&self, event: QueryEvent) {
        // Detached; the handle is dropped on purpose
        let _ = self.relay.relay(&event, &self.context);

        if let Err(e) = self.store.append(event) {
            warn!("Failed to save log locally: {}", e);
        }
    }

    fn panel(&self) -> std::sync::MutexGuard<'_, Panel> {
        self.panel.lock().unwrap_or_else(|e| e.into_inner())
    }
}
