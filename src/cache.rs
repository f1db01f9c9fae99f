//! Session-scoped memo of loaded datasets.
//!
//! Each source path gets its own cell. The first caller for a path reads the
//! file while later callers for the same path block on that cell, so one
//! source is read once and a half-built entry is never visible. Loads of
//! different paths do not wait on each other. A failed load leaves the cell
//! empty and the next caller retries.

use crate::error::DataLoadError;
use crate::loader;
use crate::types::Dataset;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type Slot = Arc<OnceCell<Arc<Dataset>>>;

#[derive(Default)]
pub struct DatasetCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `path`, reading it only if no earlier call
    /// succeeded for the same source.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<Dataset>, DataLoadError> {
        let key = cache_key(path.as_ref());
        let slot = {
            let mut slots = self.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        if let Some(data) = slot.get() {
            debug!(path = %key.display(), "dataset cache hit");
            return Ok(Arc::clone(data));
        }
        let data = slot.get_or_try_init(|| {
            debug!(path = %key.display(), "dataset cache miss");
            loader::load(path.as_ref()).map(Arc::new)
        })?;
        Ok(Arc::clone(data))
    }

    /// True once a load for `path` has completed successfully.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let key = cache_key(path.as_ref());
        self.lock()
            .get(&key)
            .map(|slot| slot.get().is_some())
            .unwrap_or(false)
    }

    /// Number of sources with a loaded dataset.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Datasets already handed out stay valid.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Slot>> {
        // The map holds no invariant a panicking holder could break.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
