use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config;
use crate::coordinator::{Command, CoordinatorHandle};
use crate::library::import;
use crate::store::{FileStore, MemoryStore, StateStore};

/// Pick the state store named by the settings.
pub fn build_store(settings: &config::Settings) -> Arc<dyn StateStore> {
    if settings.store.in_memory {
        info!("using in-memory state store");
        return Arc::new(MemoryStore::new());
    }

    match settings.state_path() {
        Some(path) => {
            info!(path = %path.display(), "using state file");
            Arc::new(FileStore::new(path))
        }
        None => {
            warn!("no location for the state file (HOME unset?); state will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Import the paths given on the command line as one add-files command.
pub async fn import_paths(
    settings: &config::Settings,
    handle: &CoordinatorHandle,
    paths: Vec<PathBuf>,
) {
    if paths.is_empty() {
        return;
    }

    let library = settings.library.clone();
    let tracks = match tokio::task::spawn_blocking(move || import(&paths, &library)).await {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!(error = %e, "import task failed");
            return;
        }
    };

    if tracks.is_empty() {
        warn!("no audio files found in the given paths");
        return;
    }
    if let Err(e) = handle.execute(Command::AddFiles(tracks)).await {
        warn!(error = %e, "adding startup files failed");
    }
}
