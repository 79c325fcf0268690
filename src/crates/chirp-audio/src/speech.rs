//! Text-to-speech pass-through for animal names

use tracing::debug;

/// Platform speech output
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, lang: &str);
}

/// Used when the platform has no speech output
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechSynthesizer for NoSpeech {
    fn speak(&self, text: &str, lang: &str) {
        debug!(text, lang, "No speech synthesizer available");
    }
}

/// Human-readable form of an animal id ("polar_bear" -> "polar bear")
pub fn spoken_name(id: &str) -> String {
    id.split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
