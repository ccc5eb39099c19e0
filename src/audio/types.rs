//! Messages exchanged between the coordinator and the playback host.
//!
//! Commands flow coordinator -> host over a synchronous channel (the host
//! lives on its own thread); events flow back over an unbounded tokio channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Clamp a volume into `[0, 1]` before it reaches a sink.
pub fn clamp_volume(volume: f64) -> f64 {
    volume.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "command",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum HostCmd {
    /// Assign a source and position it without starting playback.
    Load {
        url: Arc<str>,
        current_time: f64,
        volume: f64,
    },
    /// Assign the source if it changed, position it and start playback.
    Play {
        url: Arc<str>,
        current_time: f64,
        volume: f64,
    },
    /// Stop playback, keeping the position.
    Pause,
    /// Jump to `time` seconds.
    Seek { time: f64 },
    /// Set the output volume (clamped).
    SetVolume { volume: f64 },
    /// Stop the host thread.
    #[serde(skip)]
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum HostEvent {
    /// Periodic progress while playing.
    TimeUpdate {
        source: Arc<str>,
        current_time: f64,
        duration: f64,
    },
    /// The current source played to its end.
    Ended { source: Arc<str> },
    /// A source was assigned and its duration is known.
    Loaded { source: Arc<str>, duration: f64 },
    /// The sink rejected an operation.
    Error { message: String },
}

impl HostEvent {
    /// The url the event was produced for, if it is tied to one.
    pub fn source(&self) -> Option<&Arc<str>> {
        match self {
            Self::TimeUpdate { source, .. } | Self::Ended { source } | Self::Loaded { source, .. } => {
                Some(source)
            }
            Self::Error { .. } => None,
        }
    }
}
