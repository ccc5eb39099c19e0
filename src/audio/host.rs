use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::{OnceCell, mpsc::UnboundedSender, oneshot};
use tracing::{info, warn};

use super::error::HostError;
use super::sink::SinkFactory;
use super::thread::spawn_host_thread;
use super::types::{HostCmd, HostEvent};

/// Handle to a running playback host thread.
pub struct PlaybackHost {
    tx: Sender<HostCmd>,
    join: JoinHandle<()>,
}

impl PlaybackHost {
    /// Start the host thread and wait until its sink is open.
    pub async fn spawn(
        factory: Arc<dyn SinkFactory>,
        events: UnboundedSender<HostEvent>,
        tick: Duration,
    ) -> Result<Self, HostError> {
        let (tx, rx) = mpsc::channel::<HostCmd>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let join = spawn_host_thread(factory, rx, events, ready_tx, tick).map_err(|e| {
            warn!(error = %e, "failed to spawn playback host thread");
            HostError::Startup
        })?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self { tx, join }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(HostError::Startup),
        }
    }

    pub fn send(&self, cmd: HostCmd) -> Result<(), HostError> {
        self.tx.send(cmd).map_err(|_| HostError::Disconnected)
    }

    /// Stop the host thread and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.tx.send(HostCmd::Shutdown);
        let join = self.join;
        if tokio::task::spawn_blocking(move || join.join()).await.is_err() {
            warn!("playback host thread did not exit cleanly");
        }
    }
}

/// Slot holding at most one playback host, created on first use.
///
/// Concurrent callers of [`LazyHost::get`] share a single creation.
pub struct LazyHost {
    cell: OnceCell<PlaybackHost>,
    factory: Arc<dyn SinkFactory>,
    events: UnboundedSender<HostEvent>,
    tick: Duration,
}

impl LazyHost {
    pub fn new(
        factory: Arc<dyn SinkFactory>,
        events: UnboundedSender<HostEvent>,
        tick: Duration,
    ) -> Self {
        Self {
            cell: OnceCell::new(),
            factory,
            events,
            tick,
        }
    }

    /// The running host, started if necessary.
    pub async fn get(&self) -> Result<&PlaybackHost, HostError> {
        self.cell
            .get_or_try_init(|| async {
                info!("starting playback host");
                PlaybackHost::spawn(Arc::clone(&self.factory), self.events.clone(), self.tick).await
            })
            .await
    }

    pub fn is_running(&self) -> bool {
        self.cell.initialized()
    }

    /// Send `cmd`, starting the host first if needed.
    pub async fn send(&mut self, cmd: HostCmd) -> Result<(), HostError> {
        let result = self.get().await?.send(cmd);
        self.forget_if_disconnected(&result);
        result
    }

    /// Send `cmd` only if a host is already running; otherwise do nothing.
    pub fn send_if_running(&mut self, cmd: HostCmd) -> Result<(), HostError> {
        let result = match self.cell.get() {
            Some(host) => host.send(cmd),
            None => return Ok(()),
        };
        self.forget_if_disconnected(&result);
        result
    }

    pub async fn shutdown(&mut self) {
        if let Some(host) = self.cell.take() {
            host.shutdown().await;
        }
    }

    fn forget_if_disconnected(&mut self, result: &Result<(), HostError>) {
        if matches!(result, Err(HostError::Disconnected)) {
            warn!("playback host disconnected; it will be restarted on next use");
            self.cell.take();
        }
    }
}
