//! Test doubles for the backend and the asset fetcher

use crate::backend::{AudioBackend, StreamHandle};
use crate::fetch::AssetFetcher;
use crate::{AudioError, Result, SoundBuffer};
use async_trait::async_trait;
use chirp_synth::{encode_wav, synthesize, Waveform};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What happened to a stream, in order
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Opened { id: usize, gain: f32, looping: bool },
    Stopped { id: usize },
    Gain { id: usize, gain: f32 },
}

#[derive(Default)]
struct StreamLog {
    events: Vec<StreamEvent>,
    active: usize,
    max_active: usize,
    opened: usize,
}

/// Backend that records every call instead of making sound
#[derive(Default)]
pub struct RecordingBackend {
    ready: AtomicBool,
    unavailable: AtomicBool,
    ready_attempts: AtomicUsize,
    fail: AtomicBool,
    submissions: Mutex<Vec<(Arc<SoundBuffer>, f32)>>,
    streams: Arc<Mutex<StreamLog>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready() -> Self {
        let backend = Self::new();
        backend.ready.store(true, Ordering::SeqCst);
        backend
    }

    /// A backend whose output never opens
    pub fn unavailable() -> Self {
        let backend = Self::new();
        backend.unavailable.store(true, Ordering::SeqCst);
        backend
    }

    pub fn ready_attempts(&self) -> usize {
        self.ready_attempts.load(Ordering::SeqCst)
    }

    pub fn fail_submissions(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn submitted_gains(&self) -> Vec<f32> {
        self.submissions.lock().iter().map(|(_, gain)| *gain).collect()
    }

    pub fn submitted_buffers(&self) -> Vec<Arc<SoundBuffer>> {
        self.submissions
            .lock()
            .iter()
            .map(|(buffer, _)| Arc::clone(buffer))
            .collect()
    }

    pub fn stream_events(&self) -> Vec<StreamEvent> {
        self.streams.lock().events.clone()
    }

    pub fn streams_opened(&self) -> usize {
        self.streams.lock().opened
    }

    pub fn active_streams(&self) -> usize {
        self.streams.lock().active
    }

    /// Most streams that were ever playing at the same time
    pub fn max_active_streams(&self) -> usize {
        self.streams.lock().max_active
    }

    /// Device submissions of any kind
    pub fn device_calls(&self) -> usize {
        self.submission_count() + self.streams_opened()
    }
}

impl AudioBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn ensure_ready(&self) -> Result<()> {
        self.ready_attempts.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AudioError::DeviceError("output stream failed to start".to_string()));
        }
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn submit(&self, buffer: Arc<SoundBuffer>, gain: f32) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AudioError::DeviceError("submission rejected".to_string()));
        }
        self.submissions.lock().push((buffer, gain));
        Ok(())
    }

    fn open_stream(&self, wav: Vec<u8>, gain: f32, looping: bool) -> Result<Box<dyn StreamHandle>> {
        assert_eq!(&wav[0..4], b"RIFF", "streams must be WAV containers");

        let mut log = self.streams.lock();
        let id = log.opened;
        log.opened += 1;
        log.active += 1;
        log.max_active = log.max_active.max(log.active);
        log.events.push(StreamEvent::Opened { id, gain, looping });

        Ok(Box::new(RecordingStream {
            id,
            playing: true,
            log: Arc::clone(&self.streams),
        }))
    }

    fn now(&self) -> f64 {
        0.0
    }
}

struct RecordingStream {
    id: usize,
    playing: bool,
    log: Arc<Mutex<StreamLog>>,
}

impl StreamHandle for RecordingStream {
    fn stop(&mut self) {
        if self.playing {
            self.playing = false;
            let mut log = self.log.lock();
            log.active -= 1;
            log.events.push(StreamEvent::Stopped { id: self.id });
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.log
            .lock()
            .events
            .push(StreamEvent::Gain { id: self.id, gain });
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Scripted reply for one location
#[derive(Clone)]
pub enum Reply {
    Bytes(Vec<u8>),
    Delayed(Duration, Vec<u8>),
}

/// Fetcher with canned replies; unknown locations fail like a 404
#[derive(Default)]
pub struct ScriptedFetcher {
    replies: HashMap<String, Reply>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: &str, reply: Reply) -> Self {
        self.replies.insert(location.to_string(), reply);
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }
}

#[async_trait]
impl AssetFetcher for ScriptedFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.attempts.lock().push(location.to_string());
        match self.replies.get(location).cloned() {
            Some(Reply::Bytes(bytes)) => Ok(bytes),
            Some(Reply::Delayed(delay, bytes)) => {
                tokio::time::sleep(delay).await;
                Ok(bytes)
            }
            None => Err(AudioError::fetch(location, "404 Not Found")),
        }
    }
}

/// A small valid WAV file standing in for a downloaded animal sound
pub fn animal_wav(frequency: f64) -> Vec<u8> {
    let buffer = synthesize(22_050, frequency, 0.25, Waveform::Sawtooth).unwrap();
    encode_wav(&buffer).unwrap()
}
