use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::codec::encode;
use super::model::Track;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
}

/// Extension to MIME type table. Unknown extensions map to `application/octet-stream`.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("flac", "audio/flac"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("webm", "audio/webm"),
];

/// Media type for `path`, derived from its extension only.
pub fn media_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|s| s.to_str())
        .and_then(|ext| {
            let ext = ext.to_ascii_lowercase();
            MEDIA_TYPES
                .iter()
                .find(|(e, _)| *e == ext)
                .map(|(_, media_type)| *media_type)
        })
        .unwrap_or("application/octet-stream")
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn walk(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_audio_file(path, settings))
        .collect()
}

/// Expand `paths` (files or directories) into an ordered list of audio files.
///
/// Explicit files keep the order they were given in; the contents of each
/// directory are sorted case-insensitively by path.
pub fn scan(paths: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();

    for root in paths {
        if root.is_file() {
            if is_audio_file(root, settings) {
                found.push(root.clone());
            } else {
                debug!(path = %root.display(), "skipping non-audio file");
            }
            continue;
        }

        if !root.is_dir() {
            warn!(path = %root.display(), "path does not exist");
            continue;
        }

        let mut files = walk(root, settings);
        files.sort_by_key(|p| p.to_string_lossy().to_lowercase());
        found.extend(files);
    }

    found
}

/// Read `path` into a `Track` whose payload carries the file bytes.
pub fn load_track(path: &Path) -> Result<Track, LibraryError> {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| LibraryError::NoFileName(path.to_path_buf()))?;

    let bytes = fs::read(path).map_err(|source| LibraryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let media_type = media_type_for(path);
    Ok(Track::new(name, media_type, encode(media_type, &bytes)))
}

/// Scan `paths` and load every audio file found. Unreadable files are skipped.
pub fn import(paths: &[PathBuf], settings: &LibrarySettings) -> Vec<Track> {
    scan(paths, settings)
        .iter()
        .filter_map(|path| match load_track(path) {
            Ok(track) => Some(track),
            Err(e) => {
                warn!(error = %e, "skipping track");
                None
            }
        })
        .collect()
}
