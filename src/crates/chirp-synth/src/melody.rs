//! Note sequencing
//!
//! A melody is a run of equal-length notes laid end to end in one buffer.
//! Each note gets its own envelope, measured from the note's own start, so
//! the phrase is heard as separate notes rather than one gliding tone.

use crate::error::{check_duration, check_frequency, check_sample_rate};
use crate::synth::{buffer_len, render_into};
use crate::{Envelope, Result, SoundBuffer, SynthError, Waveform};

/// Sequence sine notes of `note_duration` seconds each
pub fn sequence(sample_rate: u32, frequencies: &[f64], note_duration: f64) -> Result<SoundBuffer> {
    sequence_with_waveform(sample_rate, frequencies, note_duration, Waveform::Sine)
}

/// Sequence notes with an explicit waveform
pub fn sequence_with_waveform(
    sample_rate: u32,
    frequencies: &[f64],
    note_duration: f64,
    waveform: Waveform,
) -> Result<SoundBuffer> {
    check_sample_rate(sample_rate)?;
    check_duration(note_duration)?;
    if frequencies.is_empty() {
        return Err(SynthError::EmptyMelody);
    }
    for &frequency in frequencies {
        check_frequency(frequency)?;
    }

    let rate = sample_rate as f64;
    let total = buffer_len(sample_rate, frequencies.len() as f64 * note_duration)
        .map_err(|_| SynthError::InvalidDuration(note_duration))?;

    let boundary = |note: usize| ((note as f64 * note_duration * rate).round() as usize).min(total);

    let mut samples = vec![0.0; total];
    for (note, &frequency) in frequencies.iter().enumerate() {
        let (start, end) = (boundary(note), boundary(note + 1));
        render_into(
            &mut samples[start..end],
            sample_rate,
            frequency,
            note_duration,
            waveform,
            Envelope::NOTE,
        );
    }

    Ok(SoundBuffer::mono(sample_rate, samples))
}
