//! Whole-document JSON state
//!
//! State is read fully, mutated in memory and written back in full.
//! There is no locking: two writers of the same file can lose updates.

use super::error::StoreResult;
use super::journal::ensure_parent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// Snapshot file holding a single JSON document of type `T`
#[derive(Debug, Clone)]
pub struct SnapshotStore<T> {
    path: PathBuf,
    _state: PhantomData<fn() -> T>,
}

impl<T> SnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state
    ///
    /// A missing or corrupt file yields `T::default()`. Only genuine I/O
    /// failures (permissions, ...) are returned as errors.
    pub async fn load(&self) -> StoreResult<T> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Corrupt snapshot, starting from defaults");
                Ok(T::default())
            }
        }
    }

    /// Overwrite the file with the full state
    pub async fn save(&self, state: &T) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(state)?;
        ensure_parent(&self.path).await?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}
