use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, unbounded_channel};
use tokio::sync::broadcast;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, trace, warn};

use crate::audio::{HostCmd, HostEvent, LazyHost, SinkFactory};
use crate::config::Settings;
use crate::library::Track;
use crate::store::{STATE_KEY, StateStore};

use super::error::CoordinatorError;
use super::handle::{CoordinatorHandle, Request};
use super::messages::{Command, Reply};
use super::state::{Advance, IndexResolution, PlayerState, Step};

const REQUEST_QUEUE: usize = 64;
const UPDATE_QUEUE: usize = 64;

/// When a mutation is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Save {
    Now,
    /// Within `save_interval` of the first unsaved change.
    Throttled,
}

/// Single owner of the player state.
///
/// Every command and host event is applied synchronously to the state, then
/// broadcast, persisted and forwarded to the playback host.
pub struct Coordinator {
    state: PlayerState,
    store: Arc<dyn StateStore>,
    host: LazyHost,
    updates: broadcast::Sender<PlayerState>,
    save_interval: Duration,
    save_deadline: Option<Instant>,
    rng: StdRng,
}

impl Coordinator {
    /// Build a coordinator from whatever the store holds.
    ///
    /// Returns the receiver on which the playback host reports events; pass it
    /// to [`Coordinator::spawn`].
    pub async fn restore(
        settings: &Settings,
        store: Arc<dyn StateStore>,
        factory: Arc<dyn SinkFactory>,
    ) -> (Self, UnboundedReceiver<HostEvent>) {
        let mut rng = StdRng::from_entropy();
        let fresh = || PlayerState::with_defaults(&settings.playback);

        let state = match store.get(STATE_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<PlayerState>(value) {
                Ok(state) => {
                    let state = state.into_restored(&mut rng);
                    info!(
                        tracks = state.playlist.len(),
                        index = state.current_track_index,
                        "player state restored"
                    );
                    state
                }
                Err(e) => {
                    warn!(error = %e, "persisted player state is corrupt; starting fresh");
                    fresh()
                }
            },
            Ok(None) => {
                info!("no persisted player state; starting fresh");
                fresh()
            }
            Err(e) => {
                warn!(error = %e, "cannot read player state; starting fresh");
                fresh()
            }
        };

        let (events_tx, events_rx) = unbounded_channel();
        let host = LazyHost::new(
            factory,
            events_tx,
            Duration::from_millis(settings.host.tick_ms.max(1)),
        );
        let (updates, _) = broadcast::channel(UPDATE_QUEUE);

        let coordinator = Self {
            state,
            store,
            host,
            updates,
            save_interval: Duration::from_millis(settings.persistence.save_interval_ms),
            save_deadline: None,
            rng,
        };
        (coordinator, events_rx)
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerState> {
        self.updates.subscribe()
    }

    /// Move the coordinator into its own task.
    pub fn spawn(self, events: UnboundedReceiver<HostEvent>) -> CoordinatorHandle {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE);
        let handle = CoordinatorHandle::new(tx, self.updates.clone());
        tokio::spawn(self.run(rx, events));
        handle
    }

    /// Apply a renderer command.
    pub async fn dispatch(&mut self, command: Command) -> Result<Reply, CoordinatorError> {
        trace!(command = command.name(), "dispatch");

        match command {
            Command::GetState => return Ok(Reply::State(Box::new(self.state.clone()))),
            Command::AddFiles(tracks) => self.add_files(tracks).await?,
            Command::Play(index) => match self.state.select(index) {
                Some(track) => self.start(track).await?,
                None => debug!(?index, "play ignored: nothing to play"),
            },
            Command::Pause => {
                self.state.is_playing = false;
                let saved = self.commit(Save::Now).await;
                self.host.send_if_running(HostCmd::Pause)?;
                saved?;
            }
            Command::Next => {
                let step = self.state.advance(Advance::Explicit);
                self.follow(step).await?;
            }
            Command::Previous => {
                let step = self.state.retreat();
                self.follow(step).await?;
            }
            Command::Seek { time } => {
                let time = self
                    .state
                    .seek(time)
                    .ok_or(CoordinatorError::InvalidNumber {
                        field: "seek time",
                        value: time,
                    })?;
                let saved = self.commit(Save::Now).await;
                self.host.send_if_running(HostCmd::Seek { time })?;
                saved?;
            }
            Command::SetVolume { volume } => {
                let volume =
                    self.state
                        .set_volume(volume)
                        .ok_or(CoordinatorError::InvalidNumber {
                            field: "volume",
                            value: volume,
                        })?;
                let saved = self.commit(Save::Throttled).await;
                self.host.send_if_running(HostCmd::SetVolume { volume })?;
                saved?;
            }
            Command::ToggleShuffle => {
                if self.state.toggle_shuffle(&mut self.rng) == IndexResolution::Reset {
                    warn!("current track not found after shuffle toggle; index reset to 0");
                }
                self.commit(Save::Now).await?;
            }
            Command::CycleRepeat => {
                let mode = self.state.cycle_repeat();
                debug!(?mode, "repeat mode changed");
                self.commit(Save::Now).await?;
            }
        }

        Ok(Reply::Ack)
    }

    /// Apply an event reported by the playback host.
    ///
    /// Events produced for a source other than the current track were queued
    /// before a jump and are dropped, as is an end reported after a pause.
    pub async fn ingest(&mut self, event: HostEvent) -> Result<(), CoordinatorError> {
        if let Some(source) = event.source() {
            if !self.is_current(source) {
                trace!("dropping host event for a source that is no longer current");
                return Ok(());
            }
        }

        match event {
            HostEvent::TimeUpdate {
                current_time,
                duration,
                ..
            } => {
                self.state.record_progress(current_time, duration);
                self.commit(Save::Throttled).await
            }
            HostEvent::Loaded { duration, .. } => {
                self.state.record_duration(duration);
                self.commit(Save::Throttled).await
            }
            HostEvent::Ended { .. } if !self.state.is_playing => {
                debug!("end reported while paused; ignored");
                Ok(())
            }
            HostEvent::Ended { .. } => {
                let step = self.state.finish();
                self.follow(step).await
            }
            HostEvent::Error { message } => {
                warn!(%message, "playback host reported an error");
                self.state.is_playing = false;
                self.commit(Save::Now).await
            }
        }
    }

    /// Write any throttled change that is still pending.
    pub async fn flush(&mut self) -> Result<(), CoordinatorError> {
        if self.save_deadline.is_some() {
            self.persist().await?;
        }
        Ok(())
    }

    fn is_current(&self, source: &Arc<str>) -> bool {
        self.state
            .current_track()
            .is_some_and(|track| Arc::ptr_eq(&track.payload, source) || track.payload == *source)
    }

    #[cfg(test)]
    pub(super) fn pending_save(&self) -> Option<Instant> {
        self.save_deadline
    }

    async fn add_files(&mut self, tracks: Vec<Track>) -> Result<(), CoordinatorError> {
        if tracks.is_empty() {
            return Ok(());
        }

        let count = tracks.len();
        let was_empty = self.state.add_tracks(tracks);
        info!(count, total = self.state.playlist.len(), "tracks added");
        let saved = self.commit(Save::Now).await;

        if was_empty {
            if let Some(track) = self.state.current_track().cloned() {
                let cmd = HostCmd::Load {
                    url: Arc::clone(&track.payload),
                    current_time: self.state.current_time,
                    volume: self.state.volume,
                };
                self.host.send(cmd).await?;
            }
        }
        saved
    }

    async fn follow(&mut self, step: Step) -> Result<(), CoordinatorError> {
        match step {
            Step::Play(track) => self.start(track).await,
            Step::Stop => {
                info!("end of playlist");
                self.commit(Save::Now).await
            }
            Step::Idle => Ok(()),
        }
    }

    /// Broadcast and persist a state that is about to play `track`, then tell the host.
    async fn start(&mut self, track: Arc<Track>) -> Result<(), CoordinatorError> {
        let saved = self.commit(Save::Now).await;

        let cmd = HostCmd::Play {
            url: Arc::clone(&track.payload),
            current_time: self.state.current_time,
            volume: self.state.volume,
        };
        if let Err(e) = self.host.send(cmd).await {
            self.state.is_playing = false;
            if let Err(save_err) = self.commit(Save::Now).await {
                warn!(error = %save_err, "cannot save state after failed play");
            }
            return Err(e.into());
        }

        debug!(track = %track.name, "playing");
        saved
    }

    async fn commit(&mut self, save: Save) -> Result<(), CoordinatorError> {
        if self.updates.send(self.state.clone()).is_err() {
            trace!("no renderer listening for state updates");
        }

        match save {
            Save::Now => self.persist().await,
            Save::Throttled => {
                if self.save_deadline.is_none() {
                    self.save_deadline = Some(Instant::now() + self.save_interval);
                }
                Ok(())
            }
        }
    }

    async fn persist(&mut self) -> Result<(), CoordinatorError> {
        self.save_deadline = None;
        let value = serde_json::to_value(&self.state)?;
        self.store.set(STATE_KEY, value).await?;
        Ok(())
    }

    async fn run(
        mut self,
        mut requests: mpsc::Receiver<Request>,
        mut events: UnboundedReceiver<HostEvent>,
    ) {
        info!("coordinator started");

        loop {
            let deadline = self.save_deadline;

            tokio::select! {
                request = requests.recv() => match request {
                    Some(Request::Command { command, reply }) => {
                        let name = command.name();
                        let result = self.dispatch(command).await;
                        if let Err(e) = &result {
                            warn!(command = name, error = %e, "command failed");
                        }
                        if let Some(reply) = reply {
                            let _ = reply.send(result);
                        }
                    }
                    Some(Request::Shutdown { done }) => {
                        self.stop().await;
                        let _ = done.send(());
                        return;
                    }
                    None => break,
                },
                Some(event) = events.recv() => {
                    if let Err(e) = self.ingest(event).await {
                        warn!(error = %e, "host event failed");
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Err(e) = self.persist().await {
                        warn!(error = %e, "throttled save failed");
                    }
                }
            }
        }

        self.stop().await;
    }

    async fn stop(&mut self) {
        if let Err(e) = self.flush().await {
            warn!(error = %e, "final save failed");
        }
        self.host.shutdown().await;
        info!("coordinator stopped");
    }
}
