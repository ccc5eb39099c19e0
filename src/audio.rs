//! Playback host: a dedicated thread that owns the audio sink, turns
//! coordinator commands into sink calls and reports sink state back as events.

mod error;
mod host;
mod sink;
mod thread;
mod types;

pub use error::HostError;
pub use host::{LazyHost, PlaybackHost};
pub use sink::{AudioSink, RodioSinkFactory, SinkFactory};
pub use types::{HostCmd, HostEvent, clamp_volume};

#[cfg(test)]
pub(crate) mod testing;
