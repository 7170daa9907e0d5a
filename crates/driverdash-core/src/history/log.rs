//! Bounded, write-through session log

use uuid::Uuid;

use super::{KeyValueStore, SessionRecord};
use crate::error::DashResult;

/// Store key holding the serialized log
pub const SESSION_LOG_KEY: &str = "driverdash.sessions.v1";

/// Default number of records kept
pub const DEFAULT_LOG_CAPACITY: usize = 60;

/// Newest-first list of finished sessions.
///
/// Every mutation writes the whole list back to the store before returning.
/// The in-memory list is updated even when the write fails; the error is
/// returned so the caller can report it.
pub struct SessionLog {
    store: Box<dyn KeyValueStore>,
    records: Vec<SessionRecord>,
    capacity: usize,
}

impl SessionLog {
    /// Open the log, loading whatever the store holds
    pub fn open(store: Box<dyn KeyValueStore>, capacity: usize) -> Self {
        let mut log = Self {
            store,
            records: Vec::new(),
            capacity: capacity.max(1),
        };
        log.reload();
        log
    }

    /// Insert at the front, evicting the oldest records beyond capacity
    pub fn append(&mut self, record: SessionRecord) -> DashResult<()> {
        self.records.insert(0, record);
        self.records.truncate(self.capacity);
        self.persist()
    }

    /// Delete by id. Returns whether a record was removed.
    pub fn remove(&mut self, id: Uuid) -> DashResult<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        self.persist()?;
        Ok(removed)
    }

    /// Drop every record
    pub fn clear(&mut self) -> DashResult<()> {
        self.records.clear();
        self.persist()
    }

    /// Discard in-memory state and re-read the store.
    ///
    /// Absent or malformed data loads as an empty log.
    pub fn reload(&mut self) {
        self.records = match self.store.get(SESSION_LOG_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<SessionRecord>>(&raw) {
                Ok(mut records) => {
                    records.truncate(self.capacity);
                    records
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored session log is malformed, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
    }

    fn persist(&mut self) -> DashResult<()> {
        let json = serde_json::to_string(&self.records)?;
        self.store.set(SESSION_LOG_KEY, &json)
    }

    /// Records, newest first
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    /// Look up a record
    pub fn get(&self, id: Uuid) -> Option<&SessionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for SessionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLog")
            .field("records", &self.records.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
