use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc::UnboundedSender, oneshot};
use tracing::{debug, warn};

use super::error::HostError;
use super::sink::{AudioSink, SinkFactory};
use super::types::{HostCmd, HostEvent, clamp_volume};

/// On play, positions this close to the requested time are left alone so a
/// plain resume does not jump back by up to one tick.
const SEEK_TOLERANCE_SECS: f64 = 0.5;

/// Resume tolerance for a given poll tick. The last reported position can lag
/// the sink by a full tick, so the tolerance never drops below two of them.
pub(super) fn seek_tolerance(tick: Duration) -> f64 {
    SEEK_TOLERANCE_SECS.max(tick.as_secs_f64() * 2.0)
}

pub(super) fn spawn_host_thread(
    factory: Arc<dyn SinkFactory>,
    rx: Receiver<HostCmd>,
    events: UnboundedSender<HostEvent>,
    ready: oneshot::Sender<Result<(), HostError>>,
    tick: Duration,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("playback-host".to_string())
        .spawn(move || {
            let sink = match factory.open() {
                Ok(sink) => {
                    let _ = ready.send(Ok(()));
                    sink
                }
                Err(e) => {
                    let _ = ready.send(Err(e));
                    return;
                }
            };

            let host = HostLoop {
                sink,
                events,
                loaded: None,
                playing: false,
                seek_tolerance: seek_tolerance(tick),
            };
            host.run(rx, tick);
        })
}

struct HostLoop {
    sink: Box<dyn AudioSink>,
    events: UnboundedSender<HostEvent>,
    loaded: Option<Arc<str>>,
    playing: bool,
    seek_tolerance: f64,
}

impl HostLoop {
    fn run(mut self, rx: Receiver<HostCmd>, tick: Duration) {
        let mut next_tick = Instant::now() + tick;

        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(HostCmd::Shutdown) => break,
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {
                    self.poll();
                    next_tick = Instant::now() + tick;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.sink.pause();
        debug!("playback host stopped");
    }

    fn handle(&mut self, cmd: HostCmd) {
        let result = match cmd {
            HostCmd::Load {
                url,
                current_time,
                volume,
            } => self.load(url, current_time, volume),
            HostCmd::Play {
                url,
                current_time,
                volume,
            } => self.play(url, current_time, volume),
            HostCmd::Pause => {
                self.sink.pause();
                self.playing = false;
                Ok(())
            }
            HostCmd::Seek { time } => self.sink.seek(time),
            HostCmd::SetVolume { volume } => {
                self.sink.set_volume(clamp_volume(volume));
                Ok(())
            }
            HostCmd::Shutdown => Ok(()),
        };

        if let Err(e) = result {
            warn!(error = %e, "playback host command failed");
            // Leave the sink quiet so host and coordinator agree on "paused".
            self.sink.pause();
            self.playing = false;
            self.emit(HostEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn load(&mut self, url: Arc<str>, current_time: f64, volume: f64) -> Result<(), HostError> {
        self.sink.pause();
        self.playing = false;
        self.assign(url)?;
        self.sink.set_volume(clamp_volume(volume));
        if current_time > 0.0 {
            self.sink.seek(current_time)?;
        }
        Ok(())
    }

    fn play(&mut self, url: Arc<str>, current_time: f64, volume: f64) -> Result<(), HostError> {
        let fresh = !self.is_loaded(&url);
        if fresh {
            self.assign(url)?;
        }
        self.sink.set_volume(clamp_volume(volume));

        let reposition = if fresh {
            current_time > 0.0
        } else {
            self.sink.is_finished()
                || (self.sink.position() - current_time).abs() > self.seek_tolerance
        };
        if reposition {
            self.sink.seek(current_time)?;
        }

        self.sink.play()?;
        self.playing = true;
        Ok(())
    }

    fn assign(&mut self, url: Arc<str>) -> Result<(), HostError> {
        self.loaded = None;
        let duration = self.sink.load(&url)?;
        self.loaded = Some(Arc::clone(&url));
        if let Some(duration) = duration {
            self.emit(HostEvent::Loaded {
                source: url,
                duration,
            });
        }
        Ok(())
    }

    fn is_loaded(&self, url: &Arc<str>) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, url) || current == url)
    }

    /// Periodic check: report progress, or the end of the source.
    fn poll(&mut self) {
        if !self.playing {
            return;
        }
        let Some(source) = self.loaded.clone() else {
            return;
        };

        if self.sink.is_finished() {
            self.playing = false;
            self.emit(HostEvent::Ended { source });
        } else {
            self.emit(HostEvent::TimeUpdate {
                source,
                current_time: self.sink.position(),
                duration: self.sink.duration().unwrap_or(0.0),
            });
        }
    }

    fn emit(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            debug!("coordinator is gone; dropping host event");
        }
    }
}
