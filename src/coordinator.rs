//! The coordinator: sole authority over the player state.
//!
//! Renderers talk to it through a [`CoordinatorHandle`]; the playback host
//! reports back through [`HostEvent`](crate::audio::HostEvent)s. Each request
//! runs to completion before the next one is taken.

mod error;
mod handle;
mod messages;
mod order;
mod service;
mod state;

pub use error::CoordinatorError;
pub use handle::CoordinatorHandle;
pub use messages::{Command, Reply};
pub use service::Coordinator;
pub use state::{Advance, IndexResolution, PlayerState, RepeatMode, Step};
