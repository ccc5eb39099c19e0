use serde::{Deserialize, Serialize};

use crate::library::Track;

use super::state::PlayerState;

/// Requests a renderer can make of the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    GetState,
    AddFiles(Vec<Track>),
    /// Play the current track, or switch to the given index first.
    Play(Option<usize>),
    Pause,
    Next,
    Previous,
    Seek { time: f64 },
    SetVolume { volume: f64 },
    ToggleShuffle,
    CycleRepeat,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetState => "get-state",
            Command::AddFiles(_) => "add-files",
            Command::Play(_) => "play",
            Command::Pause => "pause",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::Seek { .. } => "seek",
            Command::SetVolume { .. } => "set-volume",
            Command::ToggleShuffle => "toggle-shuffle",
            Command::CycleRepeat => "cycle-repeat",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    State(Box<PlayerState>),
    Ack,
}
