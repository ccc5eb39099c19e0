use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{StateStore, StoreError};

/// JSON file holding one object of keys to values.
///
/// Writes go to a sibling temp file which is then renamed over the original,
/// so a crash mid-write never leaves a truncated state file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&bytes)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Malformed),
        }
    }

    async fn write_all(&self, map: Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec(&Value::Object(map))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &body).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = body.len(), "state file written");
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut map = self.read_all().await?;
        Ok(map.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        // A corrupt file is replaced rather than blocking every future save.
        let mut map = match self.read_all().await {
            Ok(map) => map,
            Err(StoreError::Io(e)) => return Err(StoreError::Io(e)),
            Err(_) => Map::new(),
        };
        map.insert(key.to_string(), value);
        self.write_all(map).await
    }
}
