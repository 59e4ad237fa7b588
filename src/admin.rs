/*!
 * Admin access gate
 *
 * A PIN unlocks the audit log viewer. The secret lives on the operator's own
 * machine, so this is a courtesy lock rather than a security boundary: there
 * is no throttling and no lockout.
 */

use std::sync::Arc;

use querydesk_core_audit::AuditLogStore;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::{QueryDeskError, Result};
use crate::viewer::AuditLogViewer;

/// Longest PIN the entry field accepts
pub const PIN_MAX_LEN: usize = 4;

/// Access state of the admin panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessSession {
    #[default]
    Locked,
    Unlocked,
}

/// PIN state machine
pub struct AccessGate {
    secret: String,
    session: AccessSession,
    entered: String,
}

impl AccessGate {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            secret: secret.into(),
            session: AccessSession::Locked,
            entered: String::new(),
        }
    }

    pub fn session(&self) -> AccessSession {
        self.session
    }

    pub fn is_unlocked(&self) -> bool {
        self.session == AccessSession::Unlocked
    }

    /// Value currently held by the PIN entry field
    pub fn entered(&self) -> &str {
        &self.entered
    }

    /// Compare `candidate` with the secret
    ///
    /// On mismatch the gate stays locked, the entry is cleared and
    /// [`QueryDeskError::AccessDenied`] is returned.
    pub fn submit_pin(&mut self, candidate: &str) -> Result<AccessSession> {
        self.entered = candidate.to_string();

        let fits = candidate.chars().count() <= PIN_MAX_LEN;
        let matches: bool = candidate.as_bytes().ct_eq(self.secret.as_bytes()).into();

        if fits && matches {
            self.session = AccessSession::Unlocked;
            self.entered.clear();
            info!("Admin console unlocked");
            Ok(self.session)
        } else {
            self.entered.clear();
            warn!("Admin PIN rejected");
            Err(QueryDeskError::AccessDenied)
        }
    }

    /// Lock unconditionally
    pub fn exit(&mut self) {
        self.session = AccessSession::Locked;
        self.entered.clear();
    }
}

/// Admin panel: the gate plus the viewer it protects
pub struct AdminConsole {
    gate: AccessGate,
    viewer: AuditLogViewer,
}

impl AdminConsole {
    pub fn new(secret: &str, store: Arc<AuditLogStore>) -> Self {
        Self {
            gate: AccessGate::new(secret),
            viewer: AuditLogViewer::new(store),
        }
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Unlock and load the current audit log snapshot
    pub fn submit_pin(&mut self, candidate: &str) -> Result<()> {
        self.gate.submit_pin(candidate)?;
        self.viewer.load();
        Ok(())
    }

    /// The viewer, reachable only while unlocked
    pub fn viewer(&self) -> Option<&AuditLogViewer> {
        self.gate.is_unlocked().then_some(&self.viewer)
    }

    pub fn viewer_mut(&mut self) -> Option<&mut AuditLogViewer> {
        if self.gate.is_unlocked() {
            Some(&mut self.viewer)
        } else {
            None
        }
    }

    /// Leave the panel: lock and drop the snapshot
    pub fn exit(&mut self) {
        self.gate.exit();
        self.viewer.clear();
    }
}
