use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::models::{Document, Settings, SettingsFile, Timestamp, SETTINGS_SCHEMA_VERSION};

pub const DOCUMENT_KEY: &str = "task-checker-v2";
pub const LEDGER_KEY: &str = "notified-tasks";
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Durable string slots addressed by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per slot under `root`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        write_atomic_bytes(&path, value.as_bytes())
    }
}

/// Writes to a sibling temp file and renames it over `path`.
pub fn write_atomic_bytes(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(temp_path, path)?;
    Ok(())
}

#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Raw contents of the document slot. A failed read is logged and reported as
/// "no saved data".
pub fn read_document(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(DOCUMENT_KEY) {
        Ok(raw) => raw,
        Err(err) => {
            log::error!("storage: failed to read document: {err}");
            None
        }
    }
}

/// Parses and migrates a stored document. Corrupt data is logged and
/// reported as "no saved data".
pub fn parse_document(raw: &str, now: Timestamp) -> Option<Document> {
    match crate::migrate::load_document(raw, now) {
        Ok(document) => Some(document),
        Err(err) => {
            log::error!("storage: failed to parse document: {err}");
            None
        }
    }
}

/// Saves the document and returns the exact text written.
pub fn save_document(store: &dyn KeyValueStore, document: &Document) -> Result<String, StorageError> {
    let json = serde_json::to_string_pretty(document)?;
    store.set(DOCUMENT_KEY, &json)?;
    Ok(json)
}

pub fn load_settings(store: &dyn KeyValueStore) -> Settings {
    let raw = match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Settings::default(),
        Err(err) => {
            log::warn!("storage: failed to read settings, using defaults: {err}");
            return Settings::default();
        }
    };
    match serde_json::from_str::<SettingsFile>(&raw) {
        Ok(file) => file.settings.normalized(),
        Err(err) => {
            log::warn!("storage: failed to parse settings, using defaults: {err}");
            Settings::default()
        }
    }
}

pub fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<(), StorageError> {
    let file = SettingsFile {
        schema_version: SETTINGS_SCHEMA_VERSION,
        settings: settings.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    store.set(SETTINGS_KEY, &json)
}

/// Settings for a process start. The first run writes the defaults out so
/// there is a settings file to edit.
pub fn load_or_seed_settings(store: &dyn KeyValueStore) -> Result<Settings, StorageError> {
    if store.get(SETTINGS_KEY)?.is_some() {
        return Ok(load_settings(store));
    }
    let settings = Settings::default();
    save_settings(store, &settings)?;
    log::info!("storage: wrote default settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SCHEMA_VERSION;

    fn now() -> Timestamp {
        "2024-03-09T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn file_store_round_trips_slots_and_reports_missing_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        store.ensure_dirs().unwrap();

        assert_eq!(store.get("notified-tasks").unwrap(), None);
        store.set("notified-tasks", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("notified-tasks").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.path().join("data").join("notified-tasks.json").exists());
        assert!(!dir.path().join("data").join("notified-tasks.tmp").exists());

        store.set("notified-tasks", "{}").unwrap();
        assert_eq!(store.get("notified-tasks").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn missing_or_corrupt_document_loads_as_none() {
        let store = MemoryStore::new();
        assert!(read_document(&store).is_none());

        store.set(DOCUMENT_KEY, "{ definitely not json").unwrap();
        let raw = read_document(&store).unwrap();
        assert!(parse_document(&raw, now()).is_none());
    }

    #[test]
    fn saved_document_loads_back_with_schema_version() {
        let store = MemoryStore::new();
        let document = Document {
            schema_version: SCHEMA_VERSION,
            checklists: Vec::new(),
            active_checklist_id: None,
        };
        let written = save_document(&store, &document).unwrap();
        let raw = read_document(&store).unwrap();
        assert_eq!(raw, written);
        assert!(raw.contains("\"schemaVersion\": 2"));
        assert_eq!(parse_document(&raw, now()), Some(document));
    }

    #[test]
    fn settings_fall_back_to_defaults_and_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(load_settings(&store), Settings::default());

        store.set(SETTINGS_KEY, "[]").unwrap();
        assert_eq!(load_settings(&store), Settings::default());

        let settings = Settings {
            dispatch_interval_secs: 5,
            rollover_interval_secs: 30,
        };
        save_settings(&store, &settings).unwrap();
        assert_eq!(load_settings(&store), settings);
    }

    #[test]
    fn first_start_seeds_settings_and_later_starts_keep_edits() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.ensure_dirs().unwrap();

        assert_eq!(load_or_seed_settings(&store).unwrap(), Settings::default());
        let raw = fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(raw.contains("\"dispatchIntervalSecs\""));

        let edited = Settings {
            dispatch_interval_secs: 15,
            ..Settings::default()
        };
        save_settings(&store, &edited).unwrap();
        assert_eq!(load_or_seed_settings(&store).unwrap(), edited);
    }

    #[test]
    fn write_atomic_bytes_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("work.json");
        write_atomic_bytes(&path, b"{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }
}
