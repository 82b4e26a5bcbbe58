//! File-backed PIN storage

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pinpad_core::{PinStore, StoreError};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// PIN storage format
#[derive(Serialize, Deserialize)]
struct PinRecord {
    /// Stored reference PIN, already hashed
    pin: String,
    /// When the PIN was last set
    updated_at: DateTime<Utc>,
    /// Wall-clock end of a max-attempt lock, survives restarts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locked_until: Option<DateTime<Utc>>,
}

/// Stores the reference PIN as JSON with owner-only permissions
#[derive(Debug, Clone)]
pub struct FilePinStore {
    path: PathBuf,
}

impl FilePinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<PinRecord>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn write(&self, record: &PinRecord) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = Zeroizing::new(
            serde_json::to_string_pretty(record).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        );
        fs::write(&self.path, contents.as_bytes())?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("Wrote PIN file {:?}", self.path);
        Ok(())
    }

    /// When the stored PIN was last changed
    pub fn last_changed(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.read()?.map(|record| record.updated_at))
    }

    /// End of the recorded lock, if any
    pub fn locked_until(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.read()?.and_then(|record| record.locked_until))
    }

    /// Record or clear the lock deadline; a no-op without a stored PIN
    pub fn set_locked_until(&self, until: Option<DateTime<Utc>>) -> Result<(), StoreError> {
        let Some(mut record) = self.read()? else {
            return Ok(());
        };
        if record.locked_until == until {
            return Ok(());
        }
        record.locked_until = until;
        self.write(&record)
    }
}

impl PinStore for FilePinStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.map(|record| record.pin))
    }

    fn set(&mut self, pin: &str) -> Result<(), StoreError> {
        self.write(&PinRecord {
            pin: pin.to_owned(),
            updated_at: Utc::now(),
            locked_until: None,
        })
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_means_no_pin() {
        let dir = tempdir().unwrap();
        let store = FilePinStore::new(dir.path().join("pin.json"));
        assert_eq!(store.get().unwrap(), None);
        assert_eq!(store.last_changed().unwrap(), None);
    }

    #[test]
    fn test_set_get_delete() {
        let dir = tempdir().unwrap();
        let mut store = FilePinStore::new(dir.path().join("sub").join("pin.json"));

        store.set("abc123").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("abc123"));
        assert!(store.last_changed().unwrap().is_some());

        store.delete().unwrap();
        assert_eq!(store.get().unwrap(), None);

        // Deleting twice is fine
        store.delete().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let mut store = FilePinStore::new(dir.path().join("pin.json"));
        store.set("abc123").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_lock_deadline_round_trip() {
        let dir = tempdir().unwrap();
        let mut store = FilePinStore::new(dir.path().join("pin.json"));
        store.set("abc123").unwrap();
        assert_eq!(store.locked_until().unwrap(), None);

        let until = Utc::now() + chrono::Duration::minutes(10);
        store.set_locked_until(Some(until)).unwrap();
        assert_eq!(store.locked_until().unwrap(), Some(until));
        assert_eq!(store.get().unwrap().as_deref(), Some("abc123"));

        // A new PIN starts unlocked
        store.set("def456").unwrap();
        assert_eq!(store.locked_until().unwrap(), None);
    }

    #[test]
    fn test_lock_deadline_needs_a_pin() {
        let dir = tempdir().unwrap();
        let store = FilePinStore::new(dir.path().join("pin.json"));

        store.set_locked_until(Some(Utc::now())).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_record_without_lock_field_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pin.json");
        fs::write(&path, r#"{"pin": "abc", "updated_at": "2026-01-01T00:00:00Z"}"#).unwrap();

        let store = FilePinStore::new(path);
        assert_eq!(store.get().unwrap().as_deref(), Some("abc"));
        assert_eq!(store.locked_until().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pin.json");
        fs::write(&path, "garbage").unwrap();

        let store = FilePinStore::new(path);
        assert!(matches!(store.get(), Err(StoreError::Corrupt(_))));
    }
}
