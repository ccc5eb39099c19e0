//! Local audio files: discovery, the `Track` model and the payload codec.
//!
//! Tracks carry their bytes with them (as a `data:` URL) so the playlist can be
//! persisted and replayed without touching the original files again.

mod codec;
mod display;
mod model;
mod scan;

pub use codec::{CodecError, DecodedMedia, decode, encode};
pub use display::display_title;
pub use model::Track;
pub use scan::{LibraryError, import, load_track, media_type_for, scan};

#[cfg(test)]
mod tests;
