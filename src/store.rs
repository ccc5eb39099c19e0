//! Durable key-value storage for the player state.

mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key the player state is stored under.
pub const STATE_KEY: &str = "playerState";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("State store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed, but is not a JSON object of keys to values
    #[error("State store is malformed: expected a JSON object")]
    Malformed,
}

/// Blob storage with get/set semantics. Values are opaque JSON.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
