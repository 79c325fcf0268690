//! Audio output using cpal
//!
//! The cpal stream lives on its own thread for as long as the backend
//! exists. Playback calls only touch the shared [`VoiceMixer`], which the
//! device callback drains.

use crate::backend::{AudioBackend, StreamHandle};
use crate::decode::decode_bytes;
use crate::voice::{Voice, VoiceId, VoiceMixer};
use crate::{AudioError, Result, SoundBuffer};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info};

/// Backend that plays through the default output device
pub struct DeviceBackend {
    /// Output sample rate reported by the device
    sample_rate: u32,
    /// Output channel count reported by the device
    channels: u16,
    /// Voices shared with the device callback
    mixer: Arc<Mutex<VoiceMixer>>,
    /// Output thread (when open)
    output: Mutex<Option<OutputThread>>,
    started: Instant,
}

struct OutputThread {
    shutdown: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl DeviceBackend {
    /// Probe the default output device
    ///
    /// The stream itself is not opened until [`AudioBackend::ensure_ready`].
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceError("No output device available".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceError(format!("Failed to get default config: {}", e)))?;

        check_sample_format(config.sample_format())?;

        Ok(DeviceBackend {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            mixer: Arc::new(Mutex::new(VoiceMixer::new())),
            output: Mutex::new(None),
            started: Instant::now(),
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of voices currently mixed into the output
    pub fn active_voices(&self) -> usize {
        self.mixer.lock().active_count()
    }

    fn require_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AudioError::NotReady)
        }
    }
}

fn check_sample_format(format: SampleFormat) -> Result<()> {
    match format {
        SampleFormat::F32 | SampleFormat::I16 => Ok(()),
        other => Err(AudioError::DeviceError(format!(
            "Unsupported sample format: {:?}",
            other
        ))),
    }
}

/// Build and start the output stream; must run on the thread that keeps it
fn open_output(mixer: Arc<Mutex<VoiceMixer>>) -> Result<Stream> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::DeviceError("No output device available".to_string()))?;

    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::DeviceError(format!("Failed to get default config: {}", e)))?;

    let sample_format = supported.sample_format();
    check_sample_format(sample_format)?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config: StreamConfig = supported.into();
    let on_error = |err: cpal::StreamError| error!("Audio stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::I16 => {
            let mut scratch: Vec<f32> = Vec::new();
            device.build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    mixer.lock().fill_buffer(&mut scratch, channels, sample_rate);
                    for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                        *out = (sample * 32767.0) as i16;
                    }
                },
                on_error,
                None,
            )
        }
        _ => device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                mixer.lock().fill_buffer(data, channels, sample_rate);
            },
            on_error,
            None,
        ),
    }
    .map_err(|e| AudioError::DeviceError(format!("Failed to build stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| AudioError::DeviceError(format!("Failed to play stream: {}", e)))?;

    Ok(stream)
}

impl AudioBackend for DeviceBackend {
    fn name(&self) -> &'static str {
        "device"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn ensure_ready(&self) -> Result<()> {
        let mut output = self.output.lock();
        if output.is_some() {
            return Ok(());
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let mixer = Arc::clone(&self.mixer);

        let handle = thread::Builder::new()
            .name("chirp-audio-output".to_string())
            .spawn(move || {
                let stream = match open_output(mixer) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                // Keep the stream alive until the backend goes away
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("Audio output thread exiting");
            })?;

        ready_rx
            .recv()
            .map_err(|_| AudioError::DeviceError("Audio output thread exited".to_string()))??;

        info!(
            sample_rate = self.sample_rate,
            channels = self.channels,
            "Audio output started"
        );

        *output = Some(OutputThread {
            shutdown: shutdown_tx,
            handle: Some(handle),
        });
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.output.lock().is_some()
    }

    fn submit(&self, buffer: Arc<SoundBuffer>, gain: f32) -> Result<()> {
        self.require_ready()?;
        self.mixer.lock().add(Voice::new(buffer).with_gain(gain));
        Ok(())
    }

    fn open_stream(&self, wav: Vec<u8>, gain: f32, looping: bool) -> Result<Box<dyn StreamHandle>> {
        self.require_ready()?;
        let buffer = decode_bytes(wav, Some("wav"))?;
        let id = self.mixer.lock().add(
            Voice::new(Arc::new(buffer))
                .with_gain(gain)
                .looping(looping),
        );
        Ok(Box::new(DeviceStream {
            mixer: Arc::clone(&self.mixer),
            id,
            stopped: false,
        }))
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl Drop for DeviceBackend {
    fn drop(&mut self) {
        if let Some(mut output) = self.output.get_mut().take() {
            let _ = output.shutdown.send(());
            if let Some(handle) = output.handle.take() {
                let _ = handle.join();
            }
        }
        self.mixer.lock().clear();
    }
}

/// A stream voice inside the device mixer
struct DeviceStream {
    mixer: Arc<Mutex<VoiceMixer>>,
    id: VoiceId,
    stopped: bool,
}

impl StreamHandle for DeviceStream {
    fn stop(&mut self) {
        if !self.stopped {
            self.mixer.lock().stop(self.id);
            self.stopped = true;
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.mixer.lock().set_gain(self.id, gain);
    }

    fn is_playing(&self) -> bool {
        !self.stopped && self.mixer.lock().is_playing(self.id)
    }
}

impl Drop for DeviceStream {
    fn drop(&mut self) {
        self.stop();
    }
}
