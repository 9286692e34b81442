//! Process-lifetime dataset cache keyed on file identity.
//!
//! Identity is the canonical path plus length and modification time. An
//! unchanged file hands back the same `Arc<Dataset>`; touching the file makes
//! the next lookup re-read it. Failed loads are never cached.

use super::ingest::{self, DataError};
use crate::domain::Dataset;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;

/// What makes two reads of a file "the same file".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileIdentity {
    pub fn of(path: &Path) -> Result<Self, DataError> {
        let io_err = |source| DataError::Io {
            path: path.to_path_buf(),
            source,
        };
        let canonical = fs::canonicalize(path).map_err(io_err)?;
        let meta = fs::metadata(&canonical).map_err(io_err)?;
        Ok(Self {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Cache of loaded datasets.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, (FileIdentity, Arc<Dataset>)>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static DatasetCache {
        static GLOBAL: OnceLock<DatasetCache> = OnceLock::new();
        GLOBAL.get_or_init(DatasetCache::new)
    }

    /// Load `path`, reusing the cached dataset if the file is unchanged.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Dataset>, DataError> {
        let identity = FileIdentity::of(path.as_ref())?;

        if let Some(hit) = self.lookup(&identity) {
            tracing::debug!(path = %identity.path.display(), "dataset cache hit");
            return Ok(hit);
        }

        tracing::debug!(path = %identity.path.display(), "dataset cache miss");
        let dataset = Arc::new(ingest::load(&identity.path)?);

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(identity.path.clone(), (identity, Arc::clone(&dataset)));
        Ok(dataset)
    }

    fn lookup(&self, identity: &FileIdentity) -> Option<Arc<Dataset>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&identity.path)
            .filter(|(cached, _)| cached == identity)
            .map(|(_, dataset)| Arc::clone(dataset))
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
