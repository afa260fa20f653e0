//! Snapshot persistence for the ledger

mod file;
mod memory;
mod parse;
mod snapshot;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use parse::{format_timestamp, parse_timestamp, MENU_TIMESTAMP_FORMAT, TIMESTAMP_FORMAT};
pub use snapshot::{decode, encode};
pub use traits::SnapshotStore;
