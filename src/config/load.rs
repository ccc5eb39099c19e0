use std::{env, path::PathBuf};

use super::schema::Settings;

const APP_DIR: &str = "offstage";

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `OFFSTAGE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("OFFSTAGE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.tick_ms == 0 {
            return Err("host.tick_ms must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err("playback.volume must be within [0, 1]".to_string());
        }
        if !(self.ui.volume_step > 0.0 && self.ui.volume_step <= 1.0) {
            return Err("ui.volume_step must be within (0, 1]".to_string());
        }
        Ok(())
    }

    /// Where the player state is persisted, unless the store is in-memory.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.store.path.clone().or_else(default_state_path)
    }

    /// Directory for log files.
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging.dir.clone().or_else(default_log_dir)
    }
}

/// Resolve the config path from `OFFSTAGE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("OFFSTAGE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/offstage/config.toml`
/// or `~/.config/offstage/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join(APP_DIR).join("config.toml"))
}

/// `$XDG_DATA_HOME/offstage/state.json` or `~/.local/share/offstage/state.json`.
pub fn default_state_path() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share").map(|d| d.join(APP_DIR).join("state.json"))
}

/// `$XDG_STATE_HOME/offstage` or `~/.local/state/offstage`.
pub fn default_log_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join(APP_DIR))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        let p = PathBuf::from(xdg);
        if p.is_absolute() {
            return Some(p);
        }
    }

    env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
}
