use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{StateStore, StoreError};

/// Store that keeps values for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
