//! Client-side credential storage.
//!
//! The arena identifies an anonymous player by two values the server hands
//! out when the player is created: the player id and a secret. A browser
//! keeps them as cookies; this client keeps them in a [`CredentialStore`].
//!
//! The store has no expiry logic of its own. Whatever it holds is the sole
//! answer to "was an identity provisioned before?".

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::StoreError;

/// Key under which the provisioned player's id is stored.
pub const PLAYER_ID_KEY: &str = "player_id";

/// Key under which the provisioned player's secret is stored.
pub const PLAYER_SECRET_KEY: &str = "player_secret";

/// Persists named string values, like a cookie jar.
///
/// Implementations use interior mutability so one store can be shared
/// (behind an `Arc`) by the session layer, which writes identity keys, and
/// the API client, which forwards every entry as a cookie.
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the value stored under `name`, if any.
    fn get(&self, name: &str) -> Option<String>;

    /// Stores `value` under `name`, replacing any previous value.
    fn set(&self, name: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `name`. Removing a missing key is not an error.
    fn remove(&self, name: &str) -> Result<(), StoreError>;

    /// All stored pairs, ordered by name.
    fn entries(&self) -> Vec<(String, String)>;
}

fn lock(map: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    // A panic while holding the lock cannot leave a BTreeMap half-written.
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given pairs.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.values).get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.values).insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        lock(&self.values).remove(name);
        Ok(())
    }

    fn entries(&self) -> Vec<(String, String)> {
        lock(&self.values)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// A store backed by a JSON file, so identity survives restarts.
///
/// The whole file is read once on [`open`](Self::open) and rewritten on
/// every mutation. Values are small and writes are rare (once per
/// provisioned identity), so there is no batching.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileCredentialStore {
    /// Opens the store at `path`. A missing file is an empty store; the
    /// file is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(StoreError::Format)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        tracing::debug!(path = %path.display(), entries = values.len(), "credential store opened");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(values).map_err(StoreError::Format)?;
        std::fs::write(&self.path, bytes).map_err(StoreError::Io)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.values).get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut values = lock(&self.values);
        values.insert(name.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut values = lock(&self.values);
        if values.remove(name).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }

    fn entries(&self) -> Vec<(String, String)> {
        lock(&self.values)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
