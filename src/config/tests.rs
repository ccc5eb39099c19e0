use super::load::{default_config_path, default_log_dir, default_state_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_offstage_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("OFFSTAGE_CONFIG_PATH", "/tmp/offstage-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/offstage-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("offstage")
            .join("config.toml")
    );
}

#[test]
fn default_paths_fall_back_to_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::remove("XDG_DATA_HOME");
    let _g3 = EnvGuard::remove("XDG_STATE_HOME");
    let _g4 = EnvGuard::set("HOME", "/tmp/home-dir");

    let home = std::path::PathBuf::from("/tmp/home-dir");
    assert_eq!(
        default_config_path().unwrap(),
        home.join(".config").join("offstage").join("config.toml")
    );
    assert_eq!(
        default_state_path().unwrap(),
        home.join(".local/share").join("offstage").join("state.json")
    );
    assert_eq!(
        default_log_dir().unwrap(),
        home.join(".local/state").join("offstage")
    );
}

#[test]
fn relative_xdg_dirs_are_ignored() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "relative/data");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_state_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/offstage/state.json")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_mode_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[store]
path = "/tmp/offstage-state.json"

[persistence]
save_interval_ms = 2000

[host]
tick_ms = 100

[playback]
volume = 0.25
repeat_mode = "repeat-one"

[ui]
header_text = "hello"
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "
scrub_seconds = 9
volume_step = 0.1

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("OFFSTAGE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("OFFSTAGE__HOST__TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(
        s.state_path().unwrap(),
        std::path::PathBuf::from("/tmp/offstage-state.json")
    );
    assert!(!s.store.in_memory);
    assert_eq!(s.persistence.save_interval_ms, 2000);
    assert_eq!(s.host.tick_ms, 100);
    assert_eq!(s.playback.volume, 0.25);
    assert!(matches!(s.playback.repeat_mode, RepeatModeSetting::One));
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.now_playing_time_fields.len(), 2);
    assert!(matches!(s.ui.now_playing_time_fields[0], TimeField::Elapsed));
    assert!(matches!(s.ui.now_playing_time_fields[1], TimeField::Remaining));
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert_eq!(s.ui.scrub_seconds, 9);
    assert_eq!(s.ui.volume_step, 0.1);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(s.logging.format, LogFormat::Json);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[host]
tick_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("OFFSTAGE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("OFFSTAGE__HOST__TICK_MS", "40");

    let s = Settings::load().unwrap();
    assert_eq!(s.host.tick_ms, 40);
}

#[test]
fn validate_rejects_unusable_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.host.tick_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ui.volume_step = 0.0;
    assert!(s.validate().is_err());
}
