use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

use crate::app::{App, InputMode, PlaybackState};
use crate::config;
use crate::coordinator::{Command, CoordinatorHandle, PlayerState};
use crate::library::import;
use crate::ui;

use super::BoxError;

/// How a popup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupExit {
    /// Closed; playback continues in the background.
    Closed,
    /// Quit the whole program.
    Quit,
}

/// One popup's terminal loop: render the latest snapshot, turn keys into
/// commands. Returns when the popup is closed or the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    handle: &CoordinatorHandle,
    app: &mut App,
    updates: &mut broadcast::Receiver<PlayerState>,
) -> Result<PopupExit, BoxError> {
    loop {
        loop {
            match updates.try_recv() {
                Ok(snapshot) => app.apply_snapshot(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "popup fell behind; refreshing snapshot");
                    app.apply_snapshot(handle.blocking_get_state()?);
                }
                Err(TryRecvError::Closed) => return Ok(PopupExit::Quit),
            }
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(exit) = handle_key_event(key, settings, handle, app) {
                    return Ok(exit);
                }
            }
        }
    }
}

pub(super) fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    handle: &CoordinatorHandle,
    app: &mut App,
) -> Option<PopupExit> {
    if is_interrupt(&key) {
        return Some(PopupExit::Quit);
    }

    if app.mode == InputMode::AddPath {
        match key.code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.pop_input_char(),
            KeyCode::Enter => add_files(settings, handle, app),
            KeyCode::Char(c) if !c.is_control() => app.push_input_char(c),
            _ => {}
        }
        return None;
    }

    let step = settings.ui.volume_step;
    let scrub = settings.ui.scrub_seconds as f64;

    match key.code {
        KeyCode::Char('q') => return Some(PopupExit::Quit),
        KeyCode::Esc => return Some(PopupExit::Closed),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if app.has_tracks() && !app.selected_is_playing() {
                let index = app.selected;
                app.follow_playback_on();
                handle.blocking_send(Command::Play(Some(index)));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            match app.playback() {
                PlaybackState::Playing => handle.blocking_send(Command::Pause),
                PlaybackState::Paused => handle.blocking_send(Command::Play(None)),
                PlaybackState::Stopped => {}
            }
        }
        KeyCode::Char('l') => {
            app.follow_playback_on();
            handle.blocking_send(Command::Next);
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            handle.blocking_send(Command::Previous);
        }
        KeyCode::Char('L') => handle.blocking_send(Command::Seek {
            time: app.seek_target(scrub),
        }),
        KeyCode::Char('H') => handle.blocking_send(Command::Seek {
            time: app.seek_target(-scrub),
        }),
        KeyCode::Char('+') | KeyCode::Char('=') => handle.blocking_send(Command::SetVolume {
            volume: app.stepped_volume(step),
        }),
        KeyCode::Char('-') => handle.blocking_send(Command::SetVolume {
            volume: app.stepped_volume(-step),
        }),
        KeyCode::Char('s') => {
            app.follow_playback_on();
            handle.blocking_send(Command::ToggleShuffle);
        }
        KeyCode::Char('r') => handle.blocking_send(Command::CycleRepeat),
        KeyCode::Char('a') => app.enter_add_mode(),
        _ => {}
    }

    None
}

/// Import the typed path and hand the tracks to the coordinator.
fn add_files(settings: &config::Settings, handle: &CoordinatorHandle, app: &mut App) {
    let Some(path) = app.take_input() else {
        return;
    };

    let tracks = import(std::slice::from_ref(&path), &settings.library);
    if tracks.is_empty() {
        app.set_status(format!("No audio files in {}", path.display()));
        return;
    }

    info!(count = tracks.len(), path = %path.display(), "importing from popup");
    app.set_status(format!("Added {} track(s)", tracks.len()));
    handle.blocking_send(Command::AddFiles(tracks));
}
