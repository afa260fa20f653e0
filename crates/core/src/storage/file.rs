//! File-backed snapshot store

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::instrument;

use super::snapshot::{decode, encode};
use super::traits::SnapshotStore;
use crate::error::{Error, Result};
use crate::models::Snapshot;

/// Stores the snapshot as a single JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Write next to the target, then rename over it
    fn write_replace(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&temp);
        })
    }
}

impl SnapshotStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Snapshot {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No snapshot found, starting with an empty ledger");
                return Snapshot::empty();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read snapshot, starting with an empty ledger");
                return Snapshot::empty();
            }
        };

        match decode(&content) {
            Ok(snapshot) => {
                tracing::debug!(
                    users = snapshot.users.len(),
                    offers = snapshot.offer_count(),
                    "Loaded snapshot"
                );
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot is corrupt, starting with an empty ledger");
                Snapshot::empty()
            }
        }
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let content = encode(snapshot)?;
        self.write_replace(&content)
            .map_err(|source| Error::PersistenceWriteFailed {
                target: self.path.display().to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HallName, MealType, Offer, User};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample() -> Snapshot {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let mut snapshot = Snapshot::empty();
        snapshot.users.insert("alice".into(), User::new("1", "017"));
        snapshot
            .offers_mut(HallName::Selim)
            .push(Offer::new("alice".into(), MealType::Dinner, 4, at));
        snapshot
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("token_data.json"));
        assert_eq!(store.load(), Snapshot::empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token_data.json");
        fs::write(&path, "{{{{ definitely not json").unwrap();
        assert_eq!(FileStore::new(&path).load(), Snapshot::empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("token_data.json"));

        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_of_load_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("token_data.json"));
        store.save(&sample()).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        store.save(&store.load()).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempdir().unwrap();
        // The target's parent is a regular file, so nothing can be created under it
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = FileStore::new(blocker.join("token_data.json"));

        let err = store.save(&sample()).unwrap_err();
        assert!(matches!(err, Error::PersistenceWriteFailed { .. }));
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // A non-empty directory sits where the snapshot should go
        let target = dir.path().join("token_data.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();
        let store = FileStore::new(&target);

        let err = store.save(&sample()).unwrap_err();
        assert!(matches!(err, Error::PersistenceWriteFailed { .. }));
        assert!(!store.temp_path().exists());
        assert!(target.join("keep").exists());
    }
}
