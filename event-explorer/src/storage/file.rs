use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// Durable store backed by one JSON object file.
///
/// The whole map is loaded on open and rewritten on every mutation
/// (temp file + rename), so a crash never leaves a half-written file.
/// A failed write leaves both the file and the in-memory map untouched.
/// An unreadable file is moved aside to `<id>.json.corrupt` on open and the
/// store starts empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Store id used when none is configured
    pub const DEFAULT_ID: &'static str = "event-explorer-storage";

    /// Open (or create) the store `id` inside `dir`.
    pub fn open(dir: impl AsRef<Path>, id: &str) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{id}.json"));

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    let aside = path.with_extension("json.corrupt");
                    tracing::warn!(
                        path = %path.display(),
                        moved_to = %aside.display(),
                        error = %e,
                        "storage file unreadable, starting empty"
                    );
                    fs::rename(&path, &aside)?;
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = entries.clone();
        mutate(&mut next);
        self.write(&next)?;
        *entries = next;
        Ok(())
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            // Best effort; the original error is what matters
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.update(BTreeMap::clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = FileStore::open(dir.path(), FileStore::DEFAULT_ID).unwrap();
            store.set("theme", "dark").unwrap();
            store.set("favorites", "[]").unwrap();
            store.delete("favorites").unwrap();
        }

        let store = FileStore::open(dir.path(), FileStore::DEFAULT_ID).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("favorites").unwrap(), None);
        assert!(store.path().ends_with("event-explorer-storage.json"));
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), "s").unwrap();
        store.set("a", "1").unwrap();
        store.clear().unwrap();

        let reopened = FileStore::open(dir.path(), "s").unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
    }

    #[test]
    fn test_stores_are_isolated_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileStore::open(dir.path(), "a").unwrap();
        let b = FileStore::open(dir.path(), "b").unwrap();

        a.set("theme", "dark").unwrap();
        assert_eq!(b.get("theme").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{oops").unwrap();

        let store = FileStore::open(dir.path(), "bad").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
        assert_eq!(
            fs::read_to_string(dir.path().join("bad.json.corrupt")).unwrap(),
            "{oops"
        );

        store.set("theme", "dark").unwrap();
        let reopened = FileStore::open(dir.path(), "bad").unwrap();
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), "s").unwrap();
        store.set("theme", "light").unwrap();

        // A non-empty directory in place of the file makes the rename fail
        let path = store.path().to_path_buf();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), "").unwrap();

        assert!(matches!(store.set("theme", "dark"), Err(StorageError::Io(_))));
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        assert!(!dir.path().join("s.json.tmp").exists());
        assert!(path.join("blocker").exists());
    }

    #[test]
    fn test_failed_temp_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), "s").unwrap();
        store.set("theme", "light").unwrap();
        fs::create_dir(dir.path().join("s.json.tmp")).unwrap();

        assert!(store.delete("theme").is_err());
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        assert_eq!(
            FileStore::open(dir.path(), "s").unwrap().get("theme").unwrap().as_deref(),
            Some("light")
        );
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.json"), "").unwrap();

        let store = FileStore::open(dir.path(), "empty").unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }
}
