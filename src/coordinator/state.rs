use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audio::clamp_volume;
use crate::config::{PlaybackSettings, RepeatModeSetting};
use crate::library::Track;

use super::order::{position_of, relink, shuffled_with_front};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    None,
    All,
    One,
}

impl RepeatMode {
    /// none -> all -> one -> none
    pub fn next(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::None => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(setting: RepeatModeSetting) -> Self {
        match setting {
            RepeatModeSetting::None => RepeatMode::None,
            RepeatModeSetting::All => RepeatMode::All,
            RepeatModeSetting::One => RepeatMode::One,
        }
    }
}

/// How `advance` was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The user asked for the next track.
    Explicit,
    /// The current track played to its end.
    NaturalEnd,
}

/// Outcome of a navigation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Play this track from `current_time`.
    Play(Arc<Track>),
    /// Playback stopped at the end of the playlist.
    Stop,
    /// Nothing to do (empty playlist).
    Idle,
}

/// Whether the current track survived a shuffle toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexResolution {
    Kept,
    /// The track could not be located in the new view; the index fell back to 0.
    Reset,
}

/// The player state owned by the coordinator. Field names are the persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub playlist: Vec<Arc<Track>>,
    pub shuffled_playlist: Vec<Arc<Track>>,
    pub current_track_index: usize,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub is_shuffled: bool,
    pub repeat_mode: RepeatMode,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playlist: Vec::new(),
            shuffled_playlist: Vec::new(),
            current_track_index: 0,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            is_shuffled: false,
            repeat_mode: RepeatMode::None,
        }
    }
}

impl PlayerState {
    /// Empty state seeded with the configured initial volume and repeat mode.
    pub fn with_defaults(playback: &PlaybackSettings) -> Self {
        Self {
            volume: clamp_volume(playback.volume),
            repeat_mode: playback.repeat_mode.into(),
            ..Self::default()
        }
    }

    /// `shuffled_playlist` when shuffled, `playlist` otherwise.
    pub fn active_playlist(&self) -> &[Arc<Track>] {
        if self.is_shuffled {
            &self.shuffled_playlist
        } else {
            &self.playlist
        }
    }

    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.active_playlist().get(self.current_track_index)
    }

    /// Append tracks in order. Returns true if the playlist was empty before.
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> bool {
        let was_empty = self.playlist.is_empty();
        for track in tracks {
            let track = Arc::new(track);
            if self.is_shuffled {
                self.shuffled_playlist.push(Arc::clone(&track));
            }
            self.playlist.push(track);
        }
        if was_empty {
            self.current_track_index = 0;
            self.current_time = 0.0;
            self.duration = 0.0;
        }
        was_empty
    }

    /// Prepare playback, optionally switching to `index` first.
    ///
    /// Returns the track to play, or `None` when the active playlist is empty
    /// or `index` is out of range.
    pub fn select(&mut self, index: Option<usize>) -> Option<Arc<Track>> {
        let len = self.active_playlist().len();
        if len == 0 {
            return None;
        }
        if let Some(index) = index {
            if index >= len {
                return None;
            }
            self.jump_to(index);
        }
        self.resume()
    }

    pub fn advance(&mut self, how: Advance) -> Step {
        let len = self.active_playlist().len();
        if len == 0 {
            return Step::Idle;
        }

        let next = if self.current_track_index + 1 < len {
            self.current_track_index + 1
        } else if how == Advance::NaturalEnd && self.repeat_mode == RepeatMode::None {
            self.is_playing = false;
            self.current_time = 0.0;
            return Step::Stop;
        } else {
            0
        };

        self.jump_to(next);
        self.resume().map_or(Step::Idle, Step::Play)
    }

    pub fn retreat(&mut self) -> Step {
        let len = self.active_playlist().len();
        if len == 0 {
            return Step::Idle;
        }
        let prev = (self.current_track_index % len + len - 1) % len;
        self.jump_to(prev);
        self.resume().map_or(Step::Idle, Step::Play)
    }

    /// The current track ended on its own.
    pub fn finish(&mut self) -> Step {
        if self.repeat_mode == RepeatMode::One {
            if self.active_playlist().is_empty() {
                return Step::Idle;
            }
            let index = self.current_track_index;
            self.jump_to(index);
            return self.resume().map_or(Step::Idle, Step::Play);
        }
        self.advance(Advance::NaturalEnd)
    }

    pub fn toggle_shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> IndexResolution {
        let current = self.current_track().cloned();
        self.is_shuffled = !self.is_shuffled;

        if self.is_shuffled {
            self.shuffled_playlist = shuffled_with_front(&self.playlist, current.as_ref(), rng);
            self.current_track_index = 0;
            return IndexResolution::Kept;
        }

        self.shuffled_playlist.clear();
        match current.and_then(|track| position_of(&self.playlist, &track)) {
            Some(index) => {
                self.current_track_index = index;
                IndexResolution::Kept
            }
            None => {
                self.current_track_index = 0;
                if self.playlist.is_empty() {
                    IndexResolution::Kept
                } else {
                    IndexResolution::Reset
                }
            }
        }
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.next();
        self.repeat_mode
    }

    /// Set the clamped volume. Non-finite input is rejected.
    pub fn set_volume(&mut self, volume: f64) -> Option<f64> {
        if !volume.is_finite() {
            return None;
        }
        self.volume = clamp_volume(volume);
        Some(self.volume)
    }

    /// Move the playhead. Non-finite input is rejected; negatives clamp to 0.
    pub fn seek(&mut self, time: f64) -> Option<f64> {
        if !time.is_finite() {
            return None;
        }
        self.current_time = time.max(0.0);
        Some(self.current_time)
    }

    /// Progress reported by the playback host.
    pub fn record_progress(&mut self, current_time: f64, duration: f64) {
        if current_time.is_finite() && current_time >= 0.0 {
            self.current_time = current_time;
        }
        self.record_duration(duration);
    }

    pub fn record_duration(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
    }

    /// Normalise a state read back from the store.
    pub fn into_restored<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.is_playing = false;
        self.volume = if self.volume.is_finite() {
            clamp_volume(self.volume)
        } else {
            1.0
        };
        if !self.current_time.is_finite() || self.current_time < 0.0 {
            self.current_time = 0.0;
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            self.duration = 0.0;
        }

        if self.is_shuffled {
            match relink(&self.playlist, &self.shuffled_playlist) {
                Some(view) => self.shuffled_playlist = view,
                None => {
                    warn!("persisted shuffle order does not match the playlist; reshuffling");
                    let current = self
                        .shuffled_playlist
                        .get(self.current_track_index)
                        .and_then(|track| position_of(&self.playlist, track))
                        .map(|i| Arc::clone(&self.playlist[i]));
                    self.shuffled_playlist =
                        shuffled_with_front(&self.playlist, current.as_ref(), rng);
                    self.current_track_index = 0;
                }
            }
        } else {
            self.shuffled_playlist.clear();
        }

        let len = self.active_playlist().len();
        if len == 0 {
            self.current_track_index = 0;
        } else if self.current_track_index >= len {
            self.current_track_index = len - 1;
        }
        self
    }

    fn jump_to(&mut self, index: usize) {
        self.current_track_index = index;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    fn resume(&mut self) -> Option<Arc<Track>> {
        let track = self.current_track().cloned()?;
        self.is_playing = true;
        Some(track)
    }
}
