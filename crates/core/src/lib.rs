//! Meal-token exchange core library
//!
//! Users, hall offer queues, expiry rules, FIFO matching and snapshot
//! persistence. Front ends drive a [`Ledger`] and render what it returns.

pub mod config;
pub mod error;
pub mod expiry;
pub mod invariants;
pub mod ledger;
pub mod matching;
pub mod models;
pub mod permissions;
pub mod storage;

pub use config::{ConfigError, LedgerConfig};
pub use error::{Error, Result};
pub use expiry::{Cutoffs, ExpiryPolicy};
pub use ledger::{HallListing, Ledger};
pub use matching::{LineItem, MatchResult};
pub use models::*;
pub use permissions::*;
pub use storage::{
    format_timestamp, parse_timestamp, FileStore, MemoryStore, SnapshotStore,
    MENU_TIMESTAMP_FORMAT,
};
