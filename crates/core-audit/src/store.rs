//! Capacity-bounded audit log store
//!
//! The log is a newest-first sequence of [`QueryEvent`]s persisted as one
//! JSON array under a fixed key. Every mutation is a single critical section
//! (load, mutate, truncate, persist) so racing completions cannot lose an
//! event. Read failures never escape: a missing, unreadable or corrupt log
//! lists as empty and is logged.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::event::QueryEvent;
use crate::storage::KeyValueStore;

/// Hard capacity of the audit log
pub const AUDIT_LOG_CAPACITY: usize = 100;

/// Key the audit log is persisted under
pub const AUDIT_LOG_KEY: &str = "querydesk_audit_log";

/// Bounded, persistent, ordered store of query events
pub struct AuditLogStore {
    medium: Arc<dyn KeyValueStore>,
    capacity: usize,
    /// Serializes read-modify-write cycles against the medium
    lock: Mutex<()>,
}

impl AuditLogStore {
    /// Create a store with the default capacity
    pub fn new(medium: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(medium, AUDIT_LOG_CAPACITY)
    }

    /// Create a store holding at most `capacity` events
    pub fn with_capacity(medium: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            medium,
            capacity: capacity.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepend `event`, evicting the oldest entries beyond capacity
    ///
    /// The new sequence is persisted before this returns. A corrupt stored
    /// log is discarded so the event is still recorded.
    pub fn append(&self, event: QueryEvent) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut events = match self.load() {
            Ok(events) => events,
            Err(e @ Error::Corrupted { .. }) => {
                warn!("Discarding unreadable audit log: {}", e);
                VecDeque::new()
            }
            Err(e) => return Err(e),
        };

        debug!(id = %event.id, query = %event.query, "Appending audit event");
        events.push_front(event);
        while events.len() > self.capacity {
            events.pop_back();
        }

        self.persist(&events)
    }

    /// Current snapshot, newest first
    pub fn list(&self) -> Vec<QueryEvent> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.load() {
            Ok(events) => events.into(),
            Err(e) => {
                warn!("Failed to read audit log: {}", e);
                Vec::new()
            }
        }
    }

    /// Drop every stored event; purging an empty log is a no-op
    pub fn purge(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.medium.remove(AUDIT_LOG_KEY)?;
        debug!("Audit log purged");
        Ok(())
    }

    fn load(&self) -> Result<VecDeque<QueryEvent>> {
        let raw = match self.medium.get(AUDIT_LOG_KEY)? {
            Some(raw) => raw,
            None => return Ok(VecDeque::new()),
        };

        let mut events: VecDeque<QueryEvent> = serde_json::from_str(&raw)
            .map_err(|e| Error::corrupted(AUDIT_LOG_KEY, e.to_string()))?;
        events.truncate(self.capacity);
        Ok(events)
    }

    fn persist(&self, events: &VecDeque<QueryEvent>) -> Result<()> {
        let json = serde_json::to_string(events)?;
        self.medium.set(AUDIT_LOG_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use tempfile::TempDir;

    fn memory_store() -> (Arc<MemoryKeyValueStore>, AuditLogStore) {
        let medium = Arc::new(MemoryKeyValueStore::new());
        let store = AuditLogStore::new(medium.clone());
        (medium, store)
    }

    /// Medium whose every operation fails
    struct BrokenMedium;

    impl KeyValueStore for BrokenMedium {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::storage("/dev/broken", "device unavailable"))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::storage("/dev/broken", "device unavailable"))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::storage("/dev/broken", "device unavailable"))
        }
    }

    #[test]
    fn test_append_is_newest_first() {
        let (_, store) = memory_store();
        store.append(QueryEvent::from_failure("first", "e")).unwrap();
        store.append(QueryEvent::from_failure("second", "e")).unwrap();

        let events = store.list();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].query, "second");
        assert_eq!(events[1].query, "first");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (_, store) = memory_store();
        for i in 0..AUDIT_LOG_CAPACITY + 1 {
            store
                .append(QueryEvent::new(&format!("q{}", i), true, 0, "[]".into()))
                .unwrap();
        }

        let events = store.list();
        assert_eq!(events.len(), AUDIT_LOG_CAPACITY);
        assert_eq!(events[0].query, format!("q{}", AUDIT_LOG_CAPACITY));
        assert!(events.iter().all(|e| e.query != "q0"));
        assert_eq!(events.last().unwrap().query, "q1");
    }

    #[test]
    fn test_custom_capacity() {
        let store = AuditLogStore::with_capacity(Arc::new(MemoryKeyValueStore::new()), 3);
        for i in 0..5 {
            store
                .append(QueryEvent::from_failure(&i.to_string(), "e"))
                .unwrap();
        }
        let queries: Vec<_> = store.list().into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["4", "3", "2"]);
    }

    #[test]
    fn test_purge_empties_log_and_is_idempotent() {
        let (_, store) = memory_store();
        store.append(QueryEvent::from_failure("q", "e")).unwrap();
        store.purge().unwrap();
        assert!(store.list().is_empty());
        store.purge().unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_corrupt_log_lists_empty_and_is_replaced() {
        let (medium, store) = memory_store();
        medium.set(AUDIT_LOG_KEY, "{not json").unwrap();

        assert!(store.list().is_empty());

        store.append(QueryEvent::from_failure("fresh", "e")).unwrap();
        let events = store.list();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].query, "fresh");
    }

    #[test]
    fn test_unavailable_medium_is_swallowed_on_list() {
        let store = AuditLogStore::new(Arc::new(BrokenMedium));
        assert!(store.list().is_empty());
        assert!(store.append(QueryEvent::from_failure("q", "e")).is_err());
        assert!(store.purge().is_err());
    }

    #[test]
    fn test_log_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        {
            let medium = Arc::new(FileKeyValueStore::new(temp.path()).unwrap());
            let store = AuditLogStore::new(medium);
            store.append(QueryEvent::from_failure("kept", "e")).unwrap();
        }

        let medium = Arc::new(FileKeyValueStore::new(temp.path()).unwrap());
        let store = AuditLogStore::new(medium);
        let events = store.list();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].query, "kept");
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let (_, store) = memory_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..5 {
                        store
                            .append(QueryEvent::from_failure(&format!("{}-{}", t, i), "e"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list().len(), 40);
    }
}
