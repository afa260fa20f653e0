//! In-memory snapshot store (for testing)

use std::cell::{Cell, RefCell};
use std::io;

use super::snapshot::{decode, encode};
use super::traits::SnapshotStore;
use crate::error::{Error, Result};
use crate::models::Snapshot;

/// Keeps the encoded snapshot in memory. Goes through the same JSON
/// encoding as [`FileStore`](super::FileStore).
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously encoded content
    pub fn with_content(content: impl Into<String>) -> Self {
        let store = Self::default();
        *store.content.borrow_mut() = Some(content.into());
        store
    }

    /// Currently stored JSON, if anything has been written
    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }

    /// Make subsequent saves fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful saves
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Snapshot {
        match self.content.borrow().as_deref() {
            Some(content) => decode(content).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored snapshot is corrupt, starting with an empty ledger");
                Snapshot::empty()
            }),
            None => Snapshot::empty(),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::PersistenceWriteFailed {
                target: "memory".to_string(),
                source: io::Error::other("simulated write failure"),
            });
        }
        *self.content.borrow_mut() = Some(encode(snapshot)?);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
