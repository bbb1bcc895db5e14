//! In-memory [`KeyValueStore`], the reference implementation of the pluggable
//! persistence capability. A networked store drops in behind the same trait.

use async_trait::async_trait;
use dashmap::DashMap;

use domains::{KeyValueStore, Result};

/// Process-local key-value store backed by a DashMap. Never fails, which
/// makes it the baseline for tests; remote implementations surface
/// `StorageUnavailable` instead.
#[derive(Debug, Default)]
pub struct MemoryKv {
    data: DashMap<String, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}
