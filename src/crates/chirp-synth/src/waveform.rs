use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Sawtooth,
    Triangle,
    Square,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Sawtooth,
        Waveform::Triangle,
        Waveform::Square,
    ];

    /// Raw oscillator value in [-1, 1] at `time` seconds for `frequency` Hz
    pub fn value_at(self, frequency: f64, time: f64) -> f64 {
        match self {
            Waveform::Sine => (2.0 * PI * frequency * time).sin(),
            Waveform::Sawtooth => saw(frequency * time),
            Waveform::Triangle => 2.0 * saw(frequency * time).abs() - 1.0,
            Waveform::Square => {
                let s = (2.0 * PI * frequency * time).sin();
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
        }
    }
}

// Centered sawtooth over the cycle count `phase`, in [-1, 1)
fn saw(phase: f64) -> f64 {
    2.0 * (phase - (phase + 0.5).floor())
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "square" | "sqr" => Ok(Waveform::Square),
            other => Err(format!(
                "Unknown waveform '{}'. Use sine, sawtooth, triangle or square",
                other
            )),
        }
    }
}
