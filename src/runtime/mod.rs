use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::audio::RodioSinkFactory;
use crate::config;
use crate::coordinator::{Coordinator, CoordinatorHandle};
use crate::tracing_config;

mod event_loop;
mod settings;
mod startup;

use event_loop::PopupExit;

/// Error type that can cross the blocking popup thread.
pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let _log_guard = match settings.log_dir() {
        Some(dir) => match tracing_config::init(&settings.logging, &dir) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("offstage: logging disabled: {e}");
                None
            }
        },
        None => None,
    };
    info!("offstage starting");

    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();

    let store = startup::build_store(&settings);
    let (coordinator, events) =
        Coordinator::restore(&settings, store, Arc::new(RodioSinkFactory)).await;
    let handle = coordinator.spawn(events);

    startup::import_paths(&settings, &handle, paths).await;

    let popup_settings = settings.clone();
    let popup_handle = handle.clone();
    let session =
        tokio::task::spawn_blocking(move || popup_session(&popup_settings, &popup_handle)).await;

    handle.shutdown().await;
    info!("offstage stopped");

    match session {
        Ok(result) => result.map_err(|e| e as Box<dyn std::error::Error>),
        Err(e) => Err(e.into()),
    }
}

/// Open popups until the user quits. Between popups the terminal shows a
/// one-line prompt while playback continues.
fn popup_session(settings: &config::Settings, handle: &CoordinatorHandle) -> Result<(), BoxError> {
    enable_raw_mode()?;

    let result: Result<(), BoxError> = (|| {
        loop {
            match open_popup(settings, handle)? {
                PopupExit::Quit => return Ok(()),
                PopupExit::Closed => {
                    info!("popup closed; playback continues");
                    if !wait_for_reopen()? {
                        return Ok(());
                    }
                }
            }
        }
    })();

    disable_raw_mode()?;
    result
}

/// Run one popup instance: fresh subscription, fresh snapshot.
fn open_popup(
    settings: &config::Settings,
    handle: &CoordinatorHandle,
) -> Result<PopupExit, BoxError> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<PopupExit, BoxError> = (|| {
        let mut updates = handle.subscribe();
        let mut app = App::new(handle.blocking_get_state()?);
        event_loop::run(&mut terminal, settings, handle, &mut app, &mut updates)
    })();

    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

/// Wait on the closed-popup prompt. Returns true to reopen, false to quit.
fn wait_for_reopen() -> io::Result<bool> {
    execute!(
        io::stdout(),
        Print("offstage keeps playing in the background. [enter] reopen  [q] quit\r\n")
    )?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if event_loop::is_interrupt(&key) {
            return Ok(false);
        }
        match key.code {
            KeyCode::Enter => return Ok(true),
            KeyCode::Char('q') => return Ok(false),
            _ => {}
        }
    }
}
