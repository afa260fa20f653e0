//! Application state management

use chrono::{Local, NaiveDateTime};
use mealtoken_core::{
    AdminIdentity, FileStore, Ledger, LedgerAction, LedgerConfig, Result, SnapshotStore, User,
};

/// Session state for one run of the front end
pub struct AppState<S: SnapshotStore> {
    pub ledger: Ledger<S>,
    pub admin: AdminIdentity,
    current_user: Option<String>,
    clock: fn() -> NaiveDateTime,
}

impl AppState<FileStore> {
    /// Open the snapshot named by the configuration
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let data_path = config.data_file_path()?;
        tracing::info!(path = %data_path.display(), "Using snapshot file");
        Self::with_store(FileStore::new(data_path), config, local_now)
    }
}

impl<S: SnapshotStore> AppState<S> {
    pub fn with_store(store: S, config: &LedgerConfig, clock: fn() -> NaiveDateTime) -> Result<Self> {
        let ledger = Ledger::open(store, config.cutoffs)?;
        Ok(Self {
            ledger,
            admin: config.admin.clone(),
            current_user: None,
            clock,
        })
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub fn set_current_user(&mut self, username: Option<String>) {
        self.current_user = username;
    }

    /// Logged-in username, if that user still exists in the ledger
    pub fn current_user(&self) -> Option<&str> {
        self.current_user
            .as_deref()
            .filter(|name| self.ledger.user(name).is_some())
    }

    pub fn current_user_record(&self) -> Option<&User> {
        self.current_user().and_then(|name| self.ledger.user(name))
    }

    pub fn can_perform(&self, action: LedgerAction) -> bool {
        let username = self.current_user().unwrap_or_default();
        self.admin
            .can_perform(username, self.current_user_record(), action)
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mealtoken_core::{Error, MemoryStore};
    use tempfile::tempdir;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_creates_snapshot_file() {
        let dir = tempdir().unwrap();
        let config = LedgerConfig {
            data_file: Some(dir.path().join("data").join("token_data.json")),
            ..LedgerConfig::default()
        };
        let state = AppState::new(&config).unwrap();
        assert!(state.ledger.store().path().exists());
    }

    #[test]
    fn test_unwritable_data_file_fails_startup() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let config = LedgerConfig {
            data_file: Some(blocker.join("data").join("token_data.json")),
            ..LedgerConfig::default()
        };
        let result = AppState::new(&config);
        assert!(matches!(result, Err(Error::PersistenceWriteFailed { .. })));
    }

    #[test]
    fn test_removed_user_is_logged_out() {
        let mut state =
            AppState::with_store(MemoryStore::new(), &LedgerConfig::default(), noon).unwrap();
        state.ledger.register_or_login("alice", "1", "017").unwrap();
        state.set_current_user(Some("alice".into()));
        assert_eq!(state.current_user(), Some("alice"));

        state.ledger.remove_user("alice").unwrap();
        assert_eq!(state.current_user(), None);
    }

    #[test]
    fn test_admin_gating() {
        let mut state =
            AppState::with_store(MemoryStore::new(), &LedgerConfig::default(), noon).unwrap();
        state
            .ledger
            .register_or_login("admin", "000000", "01111111111")
            .unwrap();
        state.ledger.register_or_login("alice", "1", "017").unwrap();

        state.set_current_user(Some("alice".into()));
        assert!(!state.can_perform(LedgerAction::RemoveUser));
        assert!(state.can_perform(LedgerAction::Sell));

        state.set_current_user(Some("admin".into()));
        assert!(state.can_perform(LedgerAction::RemoveUser));
        assert_eq!(state.now(), noon());
    }
}
