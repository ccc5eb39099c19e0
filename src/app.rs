//! Application module: exposes the popup model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the latest player state
//! snapshot plus the cursor and input state of one popup instance.

mod model;

pub use model::*;
