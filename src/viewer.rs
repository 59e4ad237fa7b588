/*!
 * Audit log viewer state
 */

use std::sync::Arc;

use querydesk_core_audit::{AuditLogStore, QueryEvent};
use uuid::Uuid;

use crate::error::Result;

/// Snapshot of the audit log with at most one expanded entry
pub struct AuditLogViewer {
    store: Arc<AuditLogStore>,
    entries: Vec<QueryEvent>,
    expanded: Option<Uuid>,
}

impl AuditLogViewer {
    pub fn new(store: Arc<AuditLogStore>) -> Self {
        Self {
            store,
            entries: Vec::new(),
            expanded: None,
        }
    }

    /// Reload the snapshot from the store
    pub fn load(&mut self) {
        self.entries = self.store.list();
        if let Some(id) = self.expanded {
            if !self.entries.iter().any(|e| e.id == id) {
                self.expanded = None;
            }
        }
    }

    /// Forget the snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
        self.expanded = None;
    }

    pub fn entries(&self) -> &[QueryEvent] {
        &self.entries
    }

    pub fn expanded(&self) -> Option<Uuid> {
        self.expanded
    }

    pub fn is_expanded(&self, id: Uuid) -> bool {
        self.expanded == Some(id)
    }

    /// Expand `id`, collapsing whatever was open; toggling the open entry
    /// collapses it
    pub fn toggle(&mut self, id: Uuid) {
        self.expanded = if self.expanded == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    /// Purge the store once `confirm` agrees
    ///
    /// Returns `Ok(false)` when the operator declined; nothing changes then.
    pub fn purge_all<F>(&mut self, confirm: F) -> Result<bool>
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            return Ok(false);
        }
        self.store.purge()?;
        self.clear();
        Ok(true)
    }
}

/// Detail payload for display: pretty JSON when it parses, raw otherwise
pub fn render_details(details: &str) -> String {
    serde_json::from_str::<serde_json::Value>(details)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| details.to_string())
}
