//! Popup model types: `App`, `PlaybackState` and `InputMode`.
//!
//! The `App` struct holds the last snapshot received from the coordinator and
//! the purely local bits of UI state (cursor, path input, status message).

use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::clamp_volume;
use crate::coordinator::PlayerState;
use crate::library::{Track, display_title};

/// The playback state shown in the status line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing to play.
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// What keystrokes currently edit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a file or directory path to import.
    AddPath,
}

/// The popup model.
pub struct App {
    pub snapshot: PlayerState,
    pub selected: usize,

    /// Cursor jumps to the current track on every snapshot until the user moves it.
    pub follow_playback: bool,

    pub mode: InputMode,
    pub input: String,
    pub status: Option<String>,
}

impl App {
    /// Create a new `App` from the coordinator's current state.
    pub fn new(snapshot: PlayerState) -> Self {
        let mut app = Self {
            snapshot: PlayerState::default(),
            selected: 0,
            follow_playback: true,
            mode: InputMode::Normal,
            input: String::new(),
            status: None,
        };
        app.apply_snapshot(snapshot);
        app
    }

    /// Replace the snapshot. Safe to call repeatedly with the same state.
    pub fn apply_snapshot(&mut self, snapshot: PlayerState) {
        self.snapshot = snapshot;
        if self.follow_playback {
            self.selected = self.snapshot.current_track_index;
        }
        self.clamp_selected();
    }

    /// The playlist as the user sees it (shuffled or not).
    pub fn tracks(&self) -> &[Arc<Track>] {
        self.snapshot.active_playlist()
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks().is_empty()
    }

    /// Titles of the visible playlist, without file extensions.
    pub fn titles(&self) -> Vec<&str> {
        self.tracks()
            .iter()
            .map(|t| display_title(&t.name))
            .collect()
    }

    pub fn now_playing(&self) -> Option<&Arc<Track>> {
        self.snapshot.current_track()
    }

    pub fn playback(&self) -> PlaybackState {
        match self.now_playing() {
            None => PlaybackState::Stopped,
            Some(_) if self.snapshot.is_playing => PlaybackState::Playing,
            Some(_) => PlaybackState::Paused,
        }
    }

    /// True when the cursor is on the track that is already playing.
    pub fn selected_is_playing(&self) -> bool {
        self.snapshot.is_playing && self.selected == self.snapshot.current_track_index
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.tracks().len();
        if len == 0 {
            return;
        }
        self.follow_playback = false;
        self.selected = (self.selected + 1) % len;
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.tracks().len();
        if len == 0 {
            return;
        }
        self.follow_playback = false;
        self.selected = (self.selected + len - 1) % len;
    }

    /// Snap the cursor back to the current track and keep following it.
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
        self.selected = self.snapshot.current_track_index;
        self.clamp_selected();
    }

    /// Playhead position `delta` seconds away, kept inside the track.
    pub fn seek_target(&self, delta: f64) -> f64 {
        let target = (self.snapshot.current_time + delta).max(0.0);
        if self.snapshot.duration > 0.0 {
            target.min(self.snapshot.duration)
        } else {
            target
        }
    }

    /// Volume after a step of `delta`, clamped.
    pub fn stepped_volume(&self, delta: f64) -> f64 {
        clamp_volume(self.snapshot.volume + delta)
    }

    pub fn enter_add_mode(&mut self) {
        self.mode = InputMode::AddPath;
        self.input.clear();
    }

    pub fn cancel_input(&mut self) {
        self.mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Leave input mode and return the typed path, if any.
    pub fn take_input(&mut self) -> Option<PathBuf> {
        self.mode = InputMode::Normal;
        let text = std::mem::take(&mut self.input);
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(expand_home(text))
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    fn clamp_selected(&mut self) {
        let len = self.tracks().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Expand a leading `~/` against `$HOME`.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
