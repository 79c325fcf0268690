//! Engine configuration

use crate::{AudioError, Result, SoundRecipe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default directory holding `animals/<id>.<ext>` files
pub const DEFAULT_ASSET_BASE: &str = "assets/sounds";

/// Configuration for the audio engine
///
/// Every field has a default, so a JSON file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate used for synthesized sounds
    pub sample_rate: u32,
    /// Master volume (0.0 to 1.0)
    pub master_volume: f32,
    /// Whether sound starts enabled
    pub sound_enabled: bool,
    /// Base directory or `http(s)://` URL for animal sound files
    pub asset_base: String,
    /// Upper bound for a single candidate fetch; `None` waits forever
    pub fetch_timeout_ms: Option<u64>,
    /// Background music level relative to the master volume
    pub music_gain: f32,
    /// Recipes replacing built-in effects or adding new ones
    pub effects: BTreeMap<String, SoundRecipe>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: 44_100,
            master_volume: 1.0,
            sound_enabled: true,
            asset_base: DEFAULT_ASSET_BASE.to_string(),
            fetch_timeout_ms: Some(5_000),
            music_gain: 0.3,
            effects: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: EngineConfig = serde_json::from_str(text)?;
        config.master_volume = clamp_volume(config.master_volume);
        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be silently corrected
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AudioError::ConfigError(
                "sample_rate must be greater than zero".to_string(),
            ));
        }
        if !self.music_gain.is_finite() || self.music_gain < 0.0 {
            return Err(AudioError::ConfigError(format!(
                "music_gain must be a non-negative number, got {}",
                self.music_gain
            )));
        }
        if self.asset_base.trim().is_empty() {
            return Err(AudioError::ConfigError(
                "asset_base must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_master_volume(mut self, volume: f32) -> Self {
        self.master_volume = clamp_volume(volume);
        self
    }

    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    pub fn with_asset_base(mut self, base: impl Into<String>) -> Self {
        self.asset_base = base.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout_ms = timeout.map(|d| d.as_millis() as u64);
        self
    }
}

/// Clamp a volume into [0, 1]; NaN counts as silence
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}
