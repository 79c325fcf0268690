//! Output backend abstraction
//!
//! The engine never talks to an audio API directly. It hands buffers to an
//! [`AudioBackend`], which mixes them into whatever output it owns.

use crate::{AudioError, Result, SoundBuffer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A place to send sound
pub trait AudioBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Open the output. Idempotent.
    fn ensure_ready(&self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Start a one-shot voice for `buffer` at `gain` and return immediately
    fn submit(&self, buffer: Arc<SoundBuffer>, gain: f32) -> Result<()>;

    /// Start playing a WAV container, optionally looping
    fn open_stream(&self, wav: Vec<u8>, gain: f32, looping: bool) -> Result<Box<dyn StreamHandle>>;

    /// Seconds since the backend was created
    fn now(&self) -> f64;
}

/// Control over a playing stream
pub trait StreamHandle: Send {
    /// Halt playback. Safe to call more than once.
    fn stop(&mut self);

    fn set_gain(&mut self, gain: f32);

    /// False once stopped or, for a non-looping stream, once finished
    fn is_playing(&self) -> bool;
}

/// Backend used when no audio output exists
///
/// Accepts everything and plays nothing.
pub struct SilentBackend {
    sample_rate: u32,
    ready: AtomicBool,
    notified: AtomicBool,
    started: Instant,
}

impl SilentBackend {
    pub fn new(sample_rate: u32) -> Self {
        SilentBackend {
            sample_rate,
            ready: AtomicBool::new(false),
            notified: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    fn notify_once(&self) {
        if !self.notified.swap(true, Ordering::Relaxed) {
            warn!("No audio output available, sounds will be silent");
        }
    }
}

impl AudioBackend for SilentBackend {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn ensure_ready(&self) -> Result<()> {
        self.ready.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    fn submit(&self, _buffer: Arc<SoundBuffer>, _gain: f32) -> Result<()> {
        if !self.is_ready() {
            return Err(AudioError::NotReady);
        }
        self.notify_once();
        Ok(())
    }

    fn open_stream(&self, _wav: Vec<u8>, _gain: f32, _looping: bool) -> Result<Box<dyn StreamHandle>> {
        if !self.is_ready() {
            return Err(AudioError::NotReady);
        }
        self.notify_once();
        Ok(Box::new(SilentStream { playing: true }))
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

struct SilentStream {
    playing: bool,
}

impl StreamHandle for SilentStream {
    fn stop(&mut self) {
        self.playing = false;
    }

    fn set_gain(&mut self, _gain: f32) {}

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Wraps a backend and switches to silence if its output fails to open
///
/// Once degraded it stays degraded: the primary backend is not retried and
/// nothing more is sent to it.
pub struct FallbackBackend {
    primary: Arc<dyn AudioBackend>,
    silent: SilentBackend,
    degraded: AtomicBool,
}

impl FallbackBackend {
    pub fn new(primary: Arc<dyn AudioBackend>) -> Self {
        let silent = SilentBackend::new(primary.sample_rate());
        FallbackBackend {
            primary,
            silent,
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether output has fallen back to silence
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    fn active(&self) -> &dyn AudioBackend {
        if self.is_degraded() {
            &self.silent
        } else {
            &*self.primary
        }
    }
}

impl AudioBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        self.active().name()
    }

    fn sample_rate(&self) -> u32 {
        self.active().sample_rate()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_degraded() {
            return Ok(());
        }
        if let Err(e) = self.primary.ensure_ready() {
            warn!(
                backend = self.primary.name(),
                "Failed to start audio output: {}. Audio disabled.", e
            );
            self.silent.ensure_ready()?;
            self.degraded.store(true, Ordering::Release);
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.active().is_ready()
    }

    fn submit(&self, buffer: Arc<SoundBuffer>, gain: f32) -> Result<()> {
        self.active().submit(buffer, gain)
    }

    fn open_stream(&self, wav: Vec<u8>, gain: f32, looping: bool) -> Result<Box<dyn StreamHandle>> {
        self.active().open_stream(wav, gain, looping)
    }

    fn now(&self) -> f64 {
        self.active().now()
    }
}

/// The device backend if one can be opened, otherwise the silent one
pub fn default_backend(sample_rate: u32) -> Arc<dyn AudioBackend> {
    #[cfg(feature = "device")]
    {
        match crate::DeviceBackend::new() {
            Ok(backend) => {
                info!(
                    sample_rate = backend.sample_rate(),
                    "Using default audio output device"
                );
                return Arc::new(backend);
            }
            Err(e) => warn!("Failed to open audio output: {}. Audio disabled.", e),
        }
    }

    info!("Using silent audio backend");
    Arc::new(SilentBackend::new(sample_rate))
}
