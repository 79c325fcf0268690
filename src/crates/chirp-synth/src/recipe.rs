use crate::{sequence_with_waveform, synthesize, Result, SoundBuffer, Waveform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A serializable description of a synthesized sound
///
/// Recipes are what the sound catalog stores; rendering one at a given
/// sample rate produces the buffer that gets cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoundRecipe {
    /// One enveloped tone
    Tone {
        frequency: f64,
        duration: f64,
        #[serde(default)]
        waveform: Waveform,
    },
    /// Equal-length notes played back to back
    Melody {
        notes: Vec<f64>,
        note_duration: f64,
        #[serde(default)]
        waveform: Waveform,
    },
}

impl SoundRecipe {
    pub fn tone(frequency: f64, duration: f64, waveform: Waveform) -> Self {
        SoundRecipe::Tone {
            frequency,
            duration,
            waveform,
        }
    }

    /// Sine melody
    pub fn melody(notes: &[f64], note_duration: f64) -> Self {
        SoundRecipe::Melody {
            notes: notes.to_vec(),
            note_duration,
            waveform: Waveform::Sine,
        }
    }

    /// Render the recipe into a mono buffer
    pub fn render(&self, sample_rate: u32) -> Result<SoundBuffer> {
        match self {
            SoundRecipe::Tone {
                frequency,
                duration,
                waveform,
            } => synthesize(sample_rate, *frequency, *duration, *waveform),
            SoundRecipe::Melody {
                notes,
                note_duration,
                waveform,
            } => sequence_with_waveform(sample_rate, notes, *note_duration, *waveform),
        }
    }

    /// Nominal length in seconds
    pub fn duration(&self) -> f64 {
        match self {
            SoundRecipe::Tone { duration, .. } => *duration,
            SoundRecipe::Melody {
                notes,
                note_duration,
                ..
            } => notes.len() as f64 * note_duration,
        }
    }
}

impl fmt::Display for SoundRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundRecipe::Tone {
                frequency,
                duration,
                waveform,
            } => write!(f, "{} {:.2}Hz for {:.2}s", waveform, frequency, duration),
            SoundRecipe::Melody {
                notes,
                note_duration,
                waveform,
            } => {
                let notes: Vec<String> = notes.iter().map(|n| format!("{:.2}", n)).collect();
                write!(
                    f,
                    "{} melody [{}] at {:.2}s/note",
                    waveform,
                    notes.join(" "),
                    note_duration
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tone() {
        let recipe = SoundRecipe::tone(800.0, 0.1, Waveform::Square);
        let buffer = recipe.render(44_100).unwrap();
        assert_eq!(buffer, synthesize(44_100, 800.0, 0.1, Waveform::Square).unwrap());
        assert!((recipe.duration() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_render_melody() {
        let recipe = SoundRecipe::melody(&[440.0, 660.0], 0.2);
        assert_eq!(recipe.render(8_000).unwrap().len(), 3_200);
        assert!((recipe.duration() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_json_shape() {
        let recipe: SoundRecipe =
            serde_json::from_str(r#"{"kind":"tone","frequency":300.0,"duration":0.25}"#).unwrap();
        assert_eq!(recipe, SoundRecipe::tone(300.0, 0.25, Waveform::Sine));

        let melody: SoundRecipe = serde_json::from_str(
            r#"{"kind":"melody","notes":[1.0,2.0],"note_duration":0.5,"waveform":"triangle"}"#,
        )
        .unwrap();
        assert!(matches!(
            melody,
            SoundRecipe::Melody {
                waveform: Waveform::Triangle,
                ..
            }
        ));
    }

    #[test]
    fn test_display() {
        let recipe = SoundRecipe::melody(&[523.25, 659.25], 0.1);
        assert_eq!(recipe.to_string(), "sine melody [523.25 659.25] at 0.10s/note");
    }
}
