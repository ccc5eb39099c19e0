use crate::audio::HostError;
use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum CoordinatorError {
    #[error("Playback host error: {0}")]
    Host(#[from] HostError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cannot serialize player state: {0}")]
    Encode(#[from] serde_json::Error),

    /// A seek or volume request carried NaN or infinity
    #[error("Rejected {field}: {value} is not a finite number")]
    InvalidNumber { field: &'static str, value: f64 },

    #[error("Coordinator replied with an unexpected message")]
    UnexpectedReply,

    /// The coordinator task has stopped
    #[error("Coordinator is not running")]
    Closed,
}
