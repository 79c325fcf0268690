//! Linear attack/release envelope
//!
//! `gain(t, d) = min(1, min(t * k, (d - t) * k))` ramps up from zero at the
//! start of a sound and back down to zero at its end. Without the ramps the
//! waveform would start and stop mid-cycle, which is heard as a click.

/// Per-sample amplitude multiplier with a fixed steepness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    steepness: f64,
}

impl Envelope {
    /// Envelope used for single tones (100 ms ramps)
    pub const TONE: Envelope = Envelope { steepness: 10.0 };

    /// Envelope used for melody notes (50 ms ramps)
    pub const NOTE: Envelope = Envelope { steepness: 20.0 };

    pub fn new(steepness: f64) -> Self {
        Envelope { steepness }
    }

    pub fn steepness(&self) -> f64 {
        self.steepness
    }

    /// Gain at `time` seconds into a sound lasting `duration` seconds
    ///
    /// Clamped to [0, 1] so times outside the sound are silent.
    pub fn gain(&self, time: f64, duration: f64) -> f64 {
        let attack = time * self.steepness;
        let release = (duration - time) * self.steepness;
        attack.min(release).clamp(0.0, 1.0)
    }
}
