//! Fire-and-forget playback of cached buffers

use crate::backend::AudioBackend;
use crate::cache::SoundCache;
use crate::config::clamp_volume;
use crate::SoundBuffer;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// User-facing sound settings shared by every playback path
///
/// Last writer wins; these are toggles, not coordination state.
#[derive(Debug)]
pub struct EngineState {
    settings: RwLock<Settings>,
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    sound_enabled: bool,
    master_volume: f32,
}

impl EngineState {
    pub fn new(sound_enabled: bool, master_volume: f32) -> Self {
        EngineState {
            settings: RwLock::new(Settings {
                sound_enabled,
                master_volume: clamp_volume(master_volume),
            }),
        }
    }

    pub fn sound_enabled(&self) -> bool {
        self.settings.read().sound_enabled
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.settings.write().sound_enabled = enabled;
    }

    pub fn master_volume(&self) -> f32 {
        self.settings.read().master_volume
    }

    /// Store a clamped volume and return what was stored
    pub fn set_master_volume(&self, volume: f32) -> f32 {
        let volume = clamp_volume(volume);
        self.settings.write().master_volume = volume;
        volume
    }
}

impl Default for EngineState {
    fn default() -> Self {
        EngineState::new(true, 1.0)
    }
}

/// Starts independent voices on the backend
///
/// Each call is its own voice with its own gain, so repeated or
/// overlapping calls never cut each other off.
pub struct PlaybackMixer {
    backend: Arc<dyn AudioBackend>,
    state: Arc<EngineState>,
}

impl PlaybackMixer {
    pub fn new(backend: Arc<dyn AudioBackend>, state: Arc<EngineState>) -> Self {
        PlaybackMixer { backend, state }
    }

    /// Play a cached sound at `volume_scale` times the master volume
    pub fn play(&self, cache: &SoundCache, name: &str, volume_scale: f32) {
        if !self.state.sound_enabled() {
            return;
        }

        match cache.get(name) {
            Some(buffer) => self.play_buffer(buffer, volume_scale),
            None => warn!(sound = name, "Sound not found in cache, skipping playback"),
        }
    }

    /// Play an arbitrary buffer
    pub fn play_buffer(&self, buffer: Arc<SoundBuffer>, volume_scale: f32) {
        if !self.state.sound_enabled() {
            return;
        }
        if !self.backend.is_ready() {
            debug!("Audio output not ready, skipping playback");
            return;
        }

        let gain = clamp_volume(volume_scale) * self.state.master_volume();
        if let Err(e) = self.backend.submit(buffer, gain) {
            warn!(error = %e, "Dropped sound");
        }
    }
}
