use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub mod keys {
    pub const PAIRED_TRAINER: &str = "pairedTrainer";
    pub const TRAINER_FTP: &str = "trainerFtp";
    pub const MQTT_HOSTNAME: &str = "mqtt_hostname";
    pub const MQTT_PORT: &str = "mqtt_port";
    pub const APP_ID: &str = "APP_ID";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("store encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Small named string values with an expiry, cookie style.
pub trait KeyValueStore {
    fn get(&mut self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;
    fn clear(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Entries(BTreeMap<String, Entry>);

impl Entries {
    /// Drops expired entries; returns whether anything was removed.
    fn prune(&mut self, now: DateTime<Utc>) -> bool {
        let before = self.0.len();
        self.0.retain(|_, e| e.expires_at > now);
        self.0.len() != before
    }

    fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        self.0
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone())
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration, now: DateTime<Utc>) {
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + ttl,
        };
        self.0.insert(key.to_string(), entry);
        self.prune(now);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }
}

/// Session-only store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Entries,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&mut self, key: &str) -> Option<String> {
        let now = Utc::now();
        self.entries.prune(now);
        self.entries.get(key, now)
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.set(key, value, ttl, Utc::now());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON file backed store; the file is rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Entries,
}

impl FileStore {
    /// Opens `path`, treating a missing or unreadable file as empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "store file unreadable, starting empty");
                Entries::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Entries::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "store file unreadable, starting empty");
                Entries::default()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&mut self, key: &str) -> Option<String> {
        let now = Utc::now();
        if self.entries.prune(now) {
            if let Err(e) = self.flush() {
                warn!(error = %e, "failed to persist pruned store");
            }
        }
        self.entries.get(key, now)
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.set(key, value, ttl, Utc::now());
        self.flush()
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key) {
            self.flush()?;
        }
        Ok(())
    }
}
