use crate::library::CodecError;

/// Errors raised by the playback host and its sink.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    /// No audio output device could be opened
    #[error("Audio output unavailable: {0}")]
    Output(String),

    /// The source bytes could not be decoded by the backend
    #[error("Cannot decode source: {0}")]
    Decode(String),

    /// The source URL is not a valid payload
    #[error("Invalid source URL: {0}")]
    Source(#[from] CodecError),

    /// Play or seek was requested before any source was loaded
    #[error("No source loaded")]
    NothingLoaded,

    /// The host thread exited before reporting readiness
    #[error("Playback host failed to start")]
    Startup,

    /// The host thread is gone
    #[error("Playback host is not running")]
    Disconnected,
}
