//! Background music
//!
//! At most one track plays at a time. Starting a track always stops the
//! previous one first, under the same lock, so callers never hear the two
//! overlap.

use crate::backend::{AudioBackend, StreamHandle};
use crate::mixer::EngineState;
use crate::{Result, SoundBuffer};
use chirp_synth::{encode_wav, sequence};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The theme phrase, a rising and falling C major figure
pub const THEME_NOTES: [f64; 8] = [261.63, 329.63, 392.0, 523.25, 392.0, 329.63, 293.66, 261.63];

/// Seconds per theme note
pub const THEME_NOTE_DURATION: f64 = 0.4;

/// Owns the single background track
pub struct BackgroundMusicController {
    backend: Arc<dyn AudioBackend>,
    state: Arc<EngineState>,
    sample_rate: u32,
    music_gain: f32,
    active: Mutex<Option<Box<dyn StreamHandle>>>,
}

impl BackgroundMusicController {
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        state: Arc<EngineState>,
        sample_rate: u32,
        music_gain: f32,
    ) -> Self {
        BackgroundMusicController {
            backend,
            state,
            sample_rate,
            music_gain,
            active: Mutex::new(None),
        }
    }

    /// Synthesize the theme phrase
    pub fn render_theme(&self) -> Result<SoundBuffer> {
        Ok(sequence(self.sample_rate, &THEME_NOTES, THEME_NOTE_DURATION)?)
    }

    /// The theme as a 16-bit PCM WAV file
    pub fn encode_theme(&self) -> Result<Vec<u8>> {
        Ok(encode_wav(&self.render_theme()?)?)
    }

    fn track_gain(&self) -> f32 {
        self.state.master_volume() * self.music_gain
    }

    /// Start the theme, replacing whatever is playing
    ///
    /// Silently does nothing (beyond stopping the old track) when sound is
    /// disabled or the output is not ready.
    pub fn start(&self, looping: bool) {
        let mut active = self.active.lock();
        Self::release(&mut active);

        if !self.state.sound_enabled() {
            return;
        }
        if !self.backend.is_ready() {
            debug!("Audio output not ready, not starting music");
            return;
        }

        let wav = match self.encode_theme() {
            Ok(wav) => wav,
            Err(e) => {
                warn!(error = %e, "Failed to render background music");
                return;
            }
        };

        match self.backend.open_stream(wav, self.track_gain(), looping) {
            Ok(handle) => {
                info!(looping, "Background music started");
                *active = Some(handle);
            }
            Err(e) => warn!(error = %e, "Failed to start background music"),
        }
    }

    /// Stop the current track; nothing happens if none is playing
    pub fn stop(&self) {
        let mut active = self.active.lock();
        if active.is_some() {
            info!("Background music stopped");
        }
        Self::release(&mut active);
    }

    /// Whether a track is still sounding
    pub fn is_playing(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|handle| handle.is_playing())
    }

    /// Apply the current master volume to the running track
    pub fn refresh_gain(&self) {
        let gain = self.track_gain();
        if let Some(handle) = self.active.lock().as_mut() {
            handle.set_gain(gain);
        }
    }

    fn release(active: &mut Option<Box<dyn StreamHandle>>) {
        if let Some(mut handle) = active.take() {
            handle.stop();
        }
    }
}

impl Drop for BackgroundMusicController {
    fn drop(&mut self) {
        Self::release(self.active.get_mut());
    }
}
