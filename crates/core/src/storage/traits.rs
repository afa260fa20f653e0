//! Storage traits
//!
//! The ledger only talks to its backing store through [`SnapshotStore`],
//! which allows a file-backed store in the binary and an in-memory one in
//! tests.

use crate::error::Result;
use crate::models::Snapshot;

/// Whole-snapshot persistence.
///
/// Implementations hold no ledger state between calls; they only transcode.
pub trait SnapshotStore {
    /// Read the stored snapshot. Missing or unreadable state is a fresh
    /// start, never an error.
    fn load(&self) -> Snapshot;

    /// Overwrite the stored snapshot. Failures surface as
    /// [`Error::PersistenceWriteFailed`](crate::Error::PersistenceWriteFailed).
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
