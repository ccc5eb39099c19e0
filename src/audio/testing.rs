//! In-memory sink used by host and coordinator tests.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::error::HostError;
use super::sink::{AudioSink, SinkFactory};

pub const TEST_DURATION: f64 = 180.0;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
}

#[derive(Default)]
struct Shared {
    calls: Vec<SinkCall>,
    opened: usize,
    position: f64,
    finished: bool,
    fail_open: bool,
    fail_play: bool,
}

/// Test-side view of every sink the factory opened.
#[derive(Clone, Default)]
pub struct SinkProbe(Arc<Mutex<Shared>>);

impl SinkProbe {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().calls.clone()
    }

    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    /// Pretend the loaded source drained.
    pub fn finish(&self) {
        self.lock().finished = true;
    }

    pub fn set_position(&self, position: f64) {
        self.lock().position = position;
    }

    pub fn fail_open(&self) {
        self.lock().fail_open = true;
    }

    pub fn fail_play(&self) {
        self.lock().fail_play = true;
    }

    /// Poll until `pred` holds for the recorded calls, or give up after two seconds.
    pub async fn wait_for(&self, pred: impl Fn(&[SinkCall]) -> bool) -> Vec<SinkCall> {
        for _ in 0..200 {
            let calls = self.calls();
            if pred(&calls) {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.calls()
    }
}

pub struct RecordingFactory {
    probe: SinkProbe,
}

impl RecordingFactory {
    pub fn new() -> (Arc<Self>, SinkProbe) {
        let probe = SinkProbe::default();
        let factory = Arc::new(Self {
            probe: probe.clone(),
        });
        (factory, probe)
    }
}

impl SinkFactory for RecordingFactory {
    fn open(&self) -> Result<Box<dyn AudioSink>, HostError> {
        let mut shared = self.probe.lock();
        shared.opened += 1;
        if shared.fail_open {
            return Err(HostError::Output("no output device".to_string()));
        }
        Ok(Box::new(RecordingSink {
            probe: self.probe.clone(),
            loaded: false,
        }))
    }
}

struct RecordingSink {
    probe: SinkProbe,
    loaded: bool,
}

impl AudioSink for RecordingSink {
    fn load(&mut self, url: &str) -> Result<Option<f64>, HostError> {
        let mut shared = self.probe.lock();
        shared.calls.push(SinkCall::Load(url.to_string()));
        shared.position = 0.0;
        shared.finished = false;
        self.loaded = true;
        Ok(Some(TEST_DURATION))
    }

    fn play(&mut self) -> Result<(), HostError> {
        let mut shared = self.probe.lock();
        if shared.fail_play {
            return Err(HostError::Output("playback rejected".to_string()));
        }
        if !self.loaded {
            return Err(HostError::NothingLoaded);
        }
        shared.calls.push(SinkCall::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.probe.lock().calls.push(SinkCall::Pause);
    }

    fn seek(&mut self, position: f64) -> Result<(), HostError> {
        let mut shared = self.probe.lock();
        shared.calls.push(SinkCall::Seek(position));
        shared.position = position;
        shared.finished = false;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) {
        self.probe.lock().calls.push(SinkCall::SetVolume(volume));
    }

    fn position(&self) -> f64 {
        self.probe.lock().position
    }

    fn duration(&self) -> Option<f64> {
        self.loaded.then_some(TEST_DURATION)
    }

    fn is_finished(&self) -> bool {
        self.probe.lock().finished
    }
}
