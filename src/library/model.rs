use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single audio item. Immutable once it has been added to a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display key, unique within a playlist (the file name).
    pub name: String,
    /// MIME type of the payload.
    #[serde(rename = "type")]
    pub media_type: String,
    /// Transportable encoding of the file bytes (a `data:` URL).
    #[serde(rename = "data")]
    pub payload: Arc<str>,
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        payload: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            payload: payload.into(),
        }
    }
}
