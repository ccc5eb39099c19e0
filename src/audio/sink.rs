//! The audio sink driven by the playback host, and its `rodio` implementation.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::library::decode;

use super::error::HostError;

/// Native playback capability owned by the playback host.
///
/// Positions and durations are in seconds. The sink has no callbacks; the host
/// polls `position` and `is_finished` to produce events.
pub trait AudioSink {
    /// Assign a new source, paused at position zero. Returns its duration when known.
    fn load(&mut self, url: &str) -> Result<Option<f64>, HostError>;
    fn play(&mut self) -> Result<(), HostError>;
    fn pause(&mut self);
    fn seek(&mut self, position: f64) -> Result<(), HostError>;
    fn set_volume(&mut self, volume: f64);
    fn position(&self) -> f64;
    fn duration(&self) -> Option<f64>;
    /// True once the loaded source has played to its end.
    fn is_finished(&self) -> bool;
}

/// Opens a sink. Called on the host thread, since output streams are not `Send`
/// on every platform.
pub trait SinkFactory: Send + Sync + 'static {
    fn open(&self) -> Result<Box<dyn AudioSink>, HostError>;
}

/// Opens the default output device through `rodio`.
pub struct RodioSinkFactory;

impl SinkFactory for RodioSinkFactory {
    fn open(&self) -> Result<Box<dyn AudioSink>, HostError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| HostError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would land on the popup.
        stream.log_on_drop(false);
        Ok(Box::new(RodioSink::new(stream)))
    }
}

pub struct RodioSink {
    stream: OutputStream,
    sink: Option<Sink>,
    bytes: Option<Arc<[u8]>>,
    total: Option<Duration>,
    volume: f32,

    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl RodioSink {
    fn new(stream: OutputStream) -> Self {
        Self {
            stream,
            sink: None,
            bytes: None,
            total: None,
            volume: 1.0,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    fn elapsed(&self) -> Duration {
        let elapsed = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.total {
            Some(total) => elapsed.min(total),
            None => elapsed,
        }
    }

    fn replace_sink(&mut self, start_at: Duration) -> Result<(), HostError> {
        let bytes = self.bytes.as_ref().ok_or(HostError::NothingLoaded)?;
        let (sink, total) = create_sink_at(&self.stream, bytes, start_at)?;
        sink.set_volume(self.volume);

        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.sink = Some(sink);
        self.total = total;
        Ok(())
    }
}

impl AudioSink for RodioSink {
    fn load(&mut self, url: &str) -> Result<Option<f64>, HostError> {
        let media = decode(url)?;
        self.bytes = Some(Arc::from(media.bytes));
        self.replace_sink(Duration::ZERO)?;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        Ok(self.total.map(|d| d.as_secs_f64()))
    }

    fn play(&mut self) -> Result<(), HostError> {
        let sink = self.sink.as_ref().ok_or(HostError::NothingLoaded)?;
        sink.play();
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn seek(&mut self, position: f64) -> Result<(), HostError> {
        // Scrubbing: rebuild the sink and skip into the source.
        let target = Duration::try_from_secs_f64(position.max(0.0)).unwrap_or(Duration::ZERO);
        let playing = self.started_at.is_some();
        self.replace_sink(target)?;

        if playing {
            if let Some(sink) = self.sink.as_ref() {
                sink.play();
            }
            self.started_at = Some(Instant::now());
        } else {
            self.started_at = None;
        }
        self.accumulated = target;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume as f32;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume);
        }
    }

    fn position(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    fn duration(&self) -> Option<f64> {
        self.total.map(|d| d.as_secs_f64())
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().map(|s| s.empty()).unwrap_or(false)
    }
}

/// Create a paused `Sink` for `bytes` that starts playback at `start_at`.
fn create_sink_at(
    stream: &OutputStream,
    bytes: &Arc<[u8]>,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), HostError> {
    let decoder = Decoder::new(Cursor::new(Arc::clone(bytes)))
        .map_err(|e| HostError::Decode(e.to_string()))?;
    let total = decoder.total_duration();

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
