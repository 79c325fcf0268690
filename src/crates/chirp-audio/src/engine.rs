//! The engine facade the application talks to
//!
//! One `AudioEngine` is built at startup and shared by reference. None of
//! its playback methods return errors: a sound that cannot play is logged
//! and dropped.

use crate::animals::AnimalSoundLoader;
use crate::backend::{default_backend, AudioBackend, FallbackBackend};
use crate::cache::SoundCache;
use crate::config::EngineConfig;
use crate::effects::{catalog, Effect};
use crate::fetch::AssetFetcher;
use crate::mixer::{EngineState, PlaybackMixer};
use crate::music::BackgroundMusicController;
use crate::speech::{spoken_name, NoSpeech, SpeechSynthesizer};
use crate::Result;
use chirp_synth::write_wav;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sound effects, animal sounds and background music behind one handle
pub struct AudioEngine {
    config: EngineConfig,
    backend: Arc<FallbackBackend>,
    state: Arc<EngineState>,
    effects: SoundCache,
    mixer: PlaybackMixer,
    music: BackgroundMusicController,
    animals: AnimalSoundLoader,
    speech: Box<dyn SpeechSynthesizer>,
}

impl AudioEngine {
    /// Build the engine and synthesize every effect up front
    ///
    /// If `backend` later fails to open its output the engine carries on
    /// silently.
    pub fn new(config: EngineConfig, backend: Arc<dyn AudioBackend>) -> Result<Self> {
        config.validate()?;
        let backend = Arc::new(FallbackBackend::new(backend));

        let recipes = catalog(&config.effects);
        let effects = SoundCache::from_recipes(
            config.sample_rate,
            recipes.iter().map(|(name, recipe)| (name.as_str(), recipe)),
        );
        info!(
            effects = effects.len(),
            backend = backend.name(),
            "Audio engine created"
        );

        let state = Arc::new(EngineState::new(config.sound_enabled, config.master_volume));
        let mixer = PlaybackMixer::new(backend.clone(), Arc::clone(&state));
        let music = BackgroundMusicController::new(
            backend.clone(),
            Arc::clone(&state),
            config.sample_rate,
            config.music_gain,
        );
        let animals = AnimalSoundLoader::from_config(&config);

        Ok(AudioEngine {
            config,
            backend,
            state,
            effects,
            mixer,
            music,
            animals,
            speech: Box::new(NoSpeech),
        })
    }

    /// Build the engine on the default output device, or silently without one
    pub fn with_default_backend(config: EngineConfig) -> Result<Self> {
        let backend = default_backend(config.sample_rate);
        Self::new(config, backend)
    }

    /// Load animal sounds through `fetcher` instead of the configured base
    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.animals = AnimalSoundLoader::new(
            fetcher,
            self.config.asset_base.clone(),
            self.config.sample_rate,
        )
        .with_timeout(self.config.fetch_timeout());
        self
    }

    pub fn with_speech(mut self, speech: Box<dyn SpeechSynthesizer>) -> Self {
        self.speech = speech;
        self
    }

    /// Open the audio output
    ///
    /// Call once the application is allowed to make sound. Until then every
    /// play call is a no-op. If the output cannot be opened the engine
    /// switches to silent playback. Returns whether real output is playing.
    pub fn ensure_ready(&self) -> bool {
        if let Err(e) = self.backend.ensure_ready() {
            warn!(error = %e, "Audio output unavailable");
        }
        self.backend.is_ready() && !self.backend.is_degraded()
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_ready()
    }

    /// Whether playback fell back to silence after the output failed
    pub fn is_silent(&self) -> bool {
        self.backend.is_degraded()
    }

    /// Play a cached effect at the master volume
    pub fn play(&self, name: &str) {
        self.play_scaled(name, 1.0);
    }

    /// Play a cached effect at `volume_scale` times the master volume
    pub fn play_scaled(&self, name: &str, volume_scale: f32) {
        self.mixer.play(&self.effects, name, volume_scale);
    }

    /// Play a built-in effect at its preset volume
    pub fn play_effect(&self, effect: Effect) {
        self.play_scaled(effect.key(), effect.volume());
    }

    pub fn click(&self) {
        self.play_effect(Effect::Click);
    }

    pub fn pop(&self) {
        self.play_effect(Effect::Pop);
    }

    pub fn success(&self) {
        self.play_effect(Effect::Success);
    }

    pub fn failure(&self) {
        self.play_effect(Effect::Failure);
    }

    pub fn correct_answer(&self) {
        self.play_effect(Effect::Correct);
    }

    pub fn wrong_answer(&self) {
        self.play_effect(Effect::Wrong);
    }

    pub fn level_complete(&self) {
        self.play_effect(Effect::LevelComplete);
    }

    pub fn reward(&self) {
        self.play_effect(Effect::Reward);
    }

    pub fn star(&self) {
        self.play_effect(Effect::Star);
    }

    pub fn story_page(&self) {
        self.play_effect(Effect::StoryPage);
    }

    pub fn story_complete(&self) {
        self.play_effect(Effect::StoryComplete);
    }

    pub fn celebration(&self) {
        self.play_effect(Effect::Celebration);
    }

    pub fn whoosh(&self) {
        self.play_effect(Effect::Whoosh);
    }

    /// Start the background theme, replacing any running track
    pub fn play_background_music(&self, looping: bool) {
        self.music.start(looping);
    }

    pub fn stop_background_music(&self) {
        self.music.stop();
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.is_playing()
    }

    /// Turn all sound on or off; turning it off stops the music at once
    pub fn set_sound_enabled(&self, enabled: bool) {
        self.state.set_sound_enabled(enabled);
        info!(enabled, "Sound toggled");
        if !enabled {
            self.music.stop();
        }
    }

    pub fn is_sound_enabled(&self) -> bool {
        self.state.sound_enabled()
    }

    /// Set the master volume, clamped to [0, 1]
    pub fn set_volume(&self, volume: f32) {
        let stored = self.state.set_master_volume(volume);
        debug!(volume = stored, "Master volume set");
        self.music.refresh_gain();
    }

    pub fn volume(&self) -> f32 {
        self.state.master_volume()
    }

    /// Load animal sounds ahead of time; returns how many were loaded
    pub async fn preload_animal_sounds<I, S>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.animals.preload(ids).await
    }

    /// Play an animal sound, loading it first if needed
    ///
    /// Always plays something while sound is enabled: the recording if one
    /// loads, otherwise a synthesized tone. `lang` is only a logging hint;
    /// the candidate order is fixed.
    pub async fn play_animal_sound(&self, id: &str, lang: Option<&str>) {
        if !self.state.sound_enabled() {
            return;
        }
        debug!(animal = id, lang, "Playing animal sound");

        let buffer = match self.animals.resolve(id).await {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!(animal = id, error = %e, "Animal sound unavailable, playing fallback tone");
                match self.animals.fallback_tone() {
                    Ok(tone) => Arc::new(tone),
                    Err(e) => {
                        warn!(error = %e, "Failed to synthesize fallback tone");
                        return;
                    }
                }
            }
        };

        self.mixer.play_buffer(buffer, 1.0);
    }

    /// Say the animal's name through the platform speech output
    pub fn speak_animal_name(&self, id: &str, lang: &str) {
        if !self.state.sound_enabled() {
            return;
        }
        self.speech.speak(&spoken_name(id), lang);
    }

    /// Write the background theme to a WAV file
    pub fn export_background_music(&self, path: impl AsRef<Path>) -> Result<()> {
        let theme = self.music.render_theme()?;
        write_wav(path.as_ref(), &theme)?;
        info!(path = %path.as_ref().display(), "Exported background music");
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the backend currently producing output
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn effects(&self) -> &SoundCache {
        &self.effects
    }

    pub fn animals(&self) -> &AnimalSoundLoader {
        &self.animals
    }

    /// Stop the music and release the output
    pub fn dispose(self) {
        self.music.stop();
        info!("Audio engine disposed");
    }
}
