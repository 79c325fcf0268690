use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthError>;

/// Errors raised while building or encoding a sound
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("Frequency must be a positive finite number of Hz, got {0}")]
    InvalidFrequency(f64),

    #[error("Duration must be positive, finite and within the synthesis limit, got {0} s")]
    InvalidDuration(f64),

    #[error("Sample rate must be non-zero")]
    InvalidSampleRate,

    #[error("A melody needs at least one note")]
    EmptyMelody,

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
}

pub(crate) fn check_sample_rate(sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(SynthError::InvalidSampleRate);
    }
    Ok(())
}

pub(crate) fn check_frequency(frequency: f64) -> Result<()> {
    if !(frequency.is_finite() && frequency > 0.0) {
        return Err(SynthError::InvalidFrequency(frequency));
    }
    Ok(())
}

pub(crate) fn check_duration(duration: f64) -> Result<()> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(SynthError::InvalidDuration(duration));
    }
    Ok(())
}
