//! Session History
//!
//! Finalized session records and the bounded log that persists them.

mod log;
mod record;
mod store;

pub use log::{SessionLog, DEFAULT_LOG_CAPACITY, SESSION_LOG_KEY};
pub use record::SessionRecord;
pub use store::{FileStore, KeyValueStore, MemoryStore};
