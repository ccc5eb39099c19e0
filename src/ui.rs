//! UI rendering helpers for the terminal popup.
//!
//! This module contains functions to render the popup using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, InputMode, PlaybackState};
use crate::config::{TimeField, UiSettings};
use crate::library::display_title;

const CONTROLS: [(&str, &str); 11] = [
    ("j/k", "up/down"),
    ("enter", "play selected"),
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("H/L", "scrub"),
    ("-/+", "volume"),
    ("s", "shuffle"),
    ("r", "repeat"),
    ("a", "add files"),
    ("esc", "close (keeps playing)"),
    ("q", "quit"),
];

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    CONTROLS
        .iter()
        .map(|(key, action)| {
            if *key == "H/L" {
                format!("[H/L] scrub -/+{}s", scrub_seconds)
            } else {
                format!("[{}] {}", key, action)
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::ZERO)
}

/// Build the time text (elapsed/total/remaining) per `UiSettings`.
pub(crate) fn time_text(elapsed: f64, duration: f64, ui: &UiSettings) -> Option<String> {
    let elapsed = seconds(elapsed);
    let total = (duration > 0.0).then(|| seconds(duration));

    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .filter_map(|f| match f {
            TimeField::Elapsed => Some(format_mmss(elapsed)),
            TimeField::Total => total.map(format_mmss),
            TimeField::Remaining => total.map(|t| format!("-{}", format_mmss(t.saturating_sub(elapsed)))),
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// The status line: track, state, time, volume, shuffle and repeat.
pub(crate) fn status_text(app: &App, ui: &UiSettings) -> String {
    let state = &app.snapshot;
    let mut parts: Vec<String> = Vec::new();

    match app.now_playing() {
        Some(track) => {
            let song = display_title(&track.name);
            match time_text(state.current_time, state.duration, ui) {
                Some(time) => parts.push(format!("Song: {} [{}]", song, time)),
                None => parts.push(format!("Song: {}", song)),
            }
        }
        None => parts.push("No tracks".to_string()),
    }

    parts.push(
        match app.playback() {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
        }
        .to_string(),
    );
    parts.push(format!("Volume: {:.0}%", state.volume * 100.0));
    parts.push(format!(
        "Shuffle: {}",
        if state.is_shuffled { "ON" } else { "OFF" }
    ));
    parts.push(format!("Repeat: {}", state.repeat_mode.label()));

    if let Some(status) = &app.status {
        parts.push(status.clone());
    }

    parts.join(" • ")
}

/// Render the whole popup into `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" offstage ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding::left(1))
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Playlist, windowed around the cursor so only visible rows are built.
    {
        let titles = app.titles();
        let total = titles.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let (start, end) = if total <= list_height || list_height == 0 {
            (0, total)
        } else {
            let half = list_height / 2;
            let start = app.selected.saturating_sub(half).min(total - list_height);
            (start, start + list_height)
        };

        let current = app
            .now_playing()
            .map(|_| app.snapshot.current_track_index);
        let items: Vec<ListItem> = titles[start..end]
            .iter()
            .enumerate()
            .map(|(offset, title)| {
                let index = start + offset;
                if Some(index) == current {
                    ListItem::new(format!("♪ {}", title)).bold()
                } else {
                    ListItem::new(format!("  {}", title))
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" playlist "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(app.selected - start));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let input = match app.mode {
        InputMode::AddPath => Paragraph::new(format!("{}▏", app.input))
            .block(Block::bordered().title(" add file or directory (enter/esc) ")),
        InputMode::Normal => Paragraph::new("press [a] to add files")
            .dim()
            .block(Block::bordered().title(" add ")),
    };
    frame.render_widget(input, chunks[3]);

    let footer = Paragraph::new(controls_text(ui_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::left(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
