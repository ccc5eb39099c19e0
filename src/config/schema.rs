use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/offstage/config.toml` or `~/.config/offstage/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `OFFSTAGE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub persistence: PersistenceSettings,
    pub host: HostSettings,
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Location of the state file. Defaults to `<data dir>/offstage/state.json`.
    pub path: Option<PathBuf>,
    /// Keep state in memory only (nothing survives a restart).
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Minimum spacing between saves caused by time updates and volume changes
    /// (milliseconds). Discrete commands always save immediately.
    pub save_interval_ms: u64,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            save_interval_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// How often the playback host polls its sink and reports progress (milliseconds).
    pub tick_ms: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self { tick_ms: 250 }
    }
}

/// Initial values for a fresh player state. Ignored once state has been persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Initial volume in `[0, 1]`.
    pub volume: f64,
    /// Initial repeat mode.
    pub repeat_mode: RepeatModeSetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            repeat_mode: RepeatModeSetting::None,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "no_loop", alias = "no-loop", alias = "off")]
    None,
    #[serde(alias = "loop_all", alias = "loop-all", alias = "repeat-all")]
    All,
    #[serde(alias = "loop_one", alias = "loop-one", alias = "repeat-one")]
    One,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "opus".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which time fields to show for the status line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub now_playing_time_fields: Vec<TimeField>,

    /// Separator used to join `now_playing_time_fields`.
    pub now_playing_time_separator: String,

    /// Number of seconds to seek when pressing `H` / `L`.
    pub scrub_seconds: u64,

    /// Volume change applied by `-` / `+`.
    pub volume_step: f64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ still playing when you look away ~ ".to_string(),
            now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total],
            now_playing_time_separator: " / ".to_string(),
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format of the log file.
    pub format: LogFormat,
    /// Directory for rolling log files. Defaults to `<state dir>/offstage`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            dir: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Pretty,
    Json,
}
