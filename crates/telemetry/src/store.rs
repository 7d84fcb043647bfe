//! Durable record storage and the preference store built on it.
//!
//! Records are small JSON documents addressed by key and wrapped in a
//! versioned envelope:
//!
//! ```json
//! { "version": 1, "key": "core.analytics", "data": ["base", "statistics"] }
//! ```
//!
//! [`JsonFileStore`] keeps one file per key; [`MemoryStore`] is used by
//! tests and dry runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::endpoint::{STORAGE_KEY, STORAGE_VERSION};
use crate::error::StorageError;
use crate::preferences::PreferenceSet;

/// Keyed, versioned record storage.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the `data` of a record, `None` if it was never written.
    ///
    /// `supported` is the newest envelope version the caller understands.
    async fn load(&self, key: &str, supported: u32) -> Result<Option<Value>, StorageError>;

    /// Overwrite a record.
    async fn save(&self, key: &str, version: u32, data: Value) -> Result<(), StorageError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    key: String,
    #[serde(default)]
    data: Value,
}

/// One JSON file per record under a storage directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self, key: &str, supported: u32) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);
        let contents = match tokio::fs::read(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(key, e)),
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let envelope: Envelope =
            serde_json::from_slice(&contents).map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })?;

        if envelope.version > supported {
            return Err(StorageError::UnsupportedVersion {
                key: key.to_string(),
                found: envelope.version,
                supported,
            });
        }

        if envelope.data.is_null() {
            return Ok(None);
        }
        Ok(Some(envelope.data))
    }

    async fn save(&self, key: &str, version: u32, data: Value) -> Result<(), StorageError> {
        let envelope = Envelope {
            version,
            key: key.to_string(),
            data,
        };
        let bytes =
            serde_json::to_vec_pretty(&envelope).map_err(|source| StorageError::Encode {
                key: key.to_string(),
                source,
            })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        // Write to temp file first, then rename over the record
        let path = self.path_for(key);
        let temp_path = self.dir.join(format!("{}.tmp", key));
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| StorageError::io(key, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StorageError::io(key, e))?;
        file.sync_all().await.map_err(|e| StorageError::io(key, e))?;
        drop(file);

        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        debug!(key, path = %path.display(), "Record saved");
        Ok(())
    }
}

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: parking_lot::Mutex<HashMap<String, (u32, Value)>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with [`StorageError::Unavailable`]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing `save`
    pub fn insert(&self, key: &str, version: u32, data: Value) {
        self.records.lock().insert(key.to_string(), (version, data));
    }

    /// Raw `data` of a record
    pub fn get(&self, key: &str) -> Option<Value> {
        self.records.lock().get(key).map(|(_, data)| data.clone())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self, key: &str, supported: u32) -> Result<Option<Value>, StorageError> {
        match self.records.lock().get(key) {
            Some((version, _)) if *version > supported => Err(StorageError::UnsupportedVersion {
                key: key.to_string(),
                found: *version,
                supported,
            }),
            Some((_, data)) if data.is_null() => Ok(None),
            Some((_, data)) => Ok(Some(data.clone())),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, version: u32, data: Value) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                key: key.to_string(),
            });
        }
        self.records.lock().insert(key.to_string(), (version, data));
        Ok(())
    }
}

/// Persists the user's consent choices under [`STORAGE_KEY`].
///
/// The active set lives behind an async read-write lock. `save` holds the
/// write lock across the durable write, so a concurrent reader sees either
/// the old set or the new one, never a partial update.
pub struct PreferenceStore {
    backend: Arc<dyn RecordStore>,
    active: RwLock<PreferenceSet>,
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn RecordStore>) -> Self {
        Self {
            backend,
            active: RwLock::new(PreferenceSet::new()),
        }
    }

    /// Read the persisted preferences and make them the active set.
    ///
    /// Missing, empty and unreadable records all load as the empty set.
    pub async fn load(&self) -> PreferenceSet {
        let mut active = self.active.write().await;

        let loaded = match self.backend.load(STORAGE_KEY, STORAGE_VERSION).await {
            Ok(Some(data)) => match serde_json::from_value::<PreferenceSet>(data) {
                Ok(set) => set,
                Err(e) => {
                    warn!(error = %e, "Stored analytics preferences are malformed, ignoring");
                    PreferenceSet::new()
                }
            },
            Ok(None) => PreferenceSet::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load analytics preferences");
                PreferenceSet::new()
            }
        };

        debug!(preferences = %loaded, "Loaded preferences");
        *active = loaded.clone();
        loaded
    }

    /// Replace the preferences wholesale and persist them.
    ///
    /// On failure the active set is left untouched and the error returned.
    pub async fn save(&self, prefs: PreferenceSet) -> Result<(), StorageError> {
        let mut active = self.active.write().await;

        let data = serde_json::to_value(&prefs).map_err(|source| StorageError::Encode {
            key: STORAGE_KEY.to_string(),
            source,
        })?;
        self.backend.save(STORAGE_KEY, STORAGE_VERSION, data).await?;

        debug!(preferences = %prefs, "Saved preferences");
        *active = prefs;
        Ok(())
    }

    /// The currently active preferences
    pub async fn current(&self) -> PreferenceSet {
        self.active.read().await.clone()
    }
}
