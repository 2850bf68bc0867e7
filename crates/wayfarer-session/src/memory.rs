//! Process-local session store.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::Result;
use crate::store::SessionStore;

/// In-memory store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents (both keys of a save count separately).
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &Value) -> Result<()> {
        self.records.write().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.records.write().clear();
        Ok(())
    }
}
