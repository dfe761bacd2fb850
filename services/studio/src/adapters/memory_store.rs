//! services/studio/src/adapters/memory_store.rs
//!
//! An in-process `KeyValueStore`. Backs `--ephemeral` runs and the test suite.

use parking_lot::Mutex;
use qr_studio_core::ports::{KeyValueStore, PortResult};
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value, e.g. a hand-written payload in tests.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.values.lock().insert(key.to_string(), value.to_string());
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}
