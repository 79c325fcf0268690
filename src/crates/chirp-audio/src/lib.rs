//! Playback engine for Chirp
//!
//! This crate plays the app's sounds without shipping a single audio file
//! for them:
//! - UI effects are synthesized once at startup and cached by name
//! - Effects play as independent, overlapping, fire-and-forget voices
//! - Animal sounds are fetched from a list of candidate files, with a
//!   synthesized tone standing in when none of them can be loaded
//! - One background track at a time, looped or played once
//!
//! Nothing here raises errors to the caller during playback. A missing
//! sound is logged and skipped; no audio device means silent playback.

pub mod animals;
pub mod backend;
pub mod cache;
pub mod config;
pub mod decode;
#[cfg(feature = "device")]
pub mod device;
pub mod effects;
pub mod engine;
pub mod fetch;
pub mod mixer;
pub mod music;
pub mod retry;
pub mod speech;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;

pub use animals::{candidate_paths, AnimalSoundLoader, FALLBACK_TONE};
pub use backend::{AudioBackend, FallbackBackend, SilentBackend, StreamHandle};
pub use cache::SoundCache;
pub use config::EngineConfig;
#[cfg(feature = "device")]
pub use device::DeviceBackend;
pub use effects::Effect;
pub use engine::AudioEngine;
pub use fetch::{fetcher_for, AssetFetcher, FileFetcher, HttpFetcher};
pub use mixer::{EngineState, PlaybackMixer};
pub use music::{BackgroundMusicController, THEME_NOTES, THEME_NOTE_DURATION};
pub use retry::first_success;
pub use speech::{NoSpeech, SpeechSynthesizer};
pub use voice::{Voice, VoiceMixer};

/// Re-export the synthesis types the engine hands out
pub use chirp_synth::{SoundBuffer, SoundRecipe, Waveform};

/// Audio engine errors
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Audio device error: {0}")]
    DeviceError(String),

    #[error("Audio output is not ready")]
    NotReady,

    #[error("Failed to decode audio: {0}")]
    DecodeError(String),

    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Timed out loading {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Synthesis error: {0}")]
    SynthError(#[from] chirp_synth::SynthError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AudioError {
    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        AudioError::FetchError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AudioError>;
