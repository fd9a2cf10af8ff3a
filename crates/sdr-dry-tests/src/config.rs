// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use sdr_app_core::config::{ConfigError, ConfigStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory implementation of [`ConfigStore`] for testing.
///
/// Clones share one backing map, so a test can hand a clone to a
/// `ConfigService` and inspect the original afterwards.
///
/// # Example
///
/// ```
/// use sdr_dry_tests::InMemoryConfigStore;
/// use sdr_app_core::config::ConfigService;
/// use sdr_app_core::prefs::EnginePrefs;
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// EnginePrefs::default().save(&service).unwrap();
/// assert_eq!(store.saves(), 1);
/// assert_eq!(store.keys(), vec!["engine".to_owned()]);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    blobs: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    fail_loads: bool,
    fail_saves: bool,
}

impl InMemoryConfigStore {
    /// Create a new empty in-memory config store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `blob` under `key`.
    pub fn with_blob(key: &str, blob: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.lock().blobs.insert(key.to_owned(), blob.into());
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make every later `load_raw` fail (or stop failing).
    pub fn fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    /// Make every later `save_raw` fail (or stop failing).
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// `load_raw` calls so far, failed ones included.
    pub fn loads(&self) -> usize {
        self.lock().loads
    }

    /// `save_raw` calls so far, failed ones included.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().blobs.keys().cloned().collect()
    }

    /// Raw blob under `key`, bypassing the counters.
    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().blobs.get(key).cloned()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.loads += 1;
        if inner.fail_loads {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        inner.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.saves += 1;
        if inner.fail_saves {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        inner.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}
