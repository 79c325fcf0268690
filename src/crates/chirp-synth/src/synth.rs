//! Single-tone synthesis

use crate::error::{check_duration, check_frequency, check_sample_rate};
use crate::{Envelope, Result, SoundBuffer, SynthError, Waveform};

/// Fixed attenuation applied to every synthesized sample
///
/// Leaves headroom for several sounds to be summed by the mixer.
pub const OUTPUT_GAIN: f64 = 0.3;

/// Longest buffer the synthesizer will allocate, in samples
///
/// About 25 minutes at 44.1 kHz.
pub const MAX_SAMPLES: usize = 1 << 26;

/// Number of samples in `duration` seconds at `sample_rate`
pub fn sample_count(sample_rate: u32, duration: f64) -> usize {
    (sample_rate as f64 * duration).round() as usize
}

/// Length of a buffer about to be allocated, rejecting empty and oversized ones
pub(crate) fn buffer_len(sample_rate: u32, duration: f64) -> Result<usize> {
    match sample_count(sample_rate, duration) {
        0 => Err(SynthError::InvalidDuration(duration)),
        len if len > MAX_SAMPLES => Err(SynthError::InvalidDuration(duration)),
        len => Ok(len),
    }
}

/// Synthesize one enveloped tone as a mono buffer
pub fn synthesize(
    sample_rate: u32,
    frequency: f64,
    duration: f64,
    waveform: Waveform,
) -> Result<SoundBuffer> {
    check_sample_rate(sample_rate)?;
    check_frequency(frequency)?;
    check_duration(duration)?;

    let mut samples = vec![0.0; buffer_len(sample_rate, duration)?];
    render_into(
        &mut samples,
        sample_rate,
        frequency,
        duration,
        waveform,
        Envelope::TONE,
    );
    Ok(SoundBuffer::mono(sample_rate, samples))
}

/// Write an enveloped tone into `out`, with time measured from `out[0]`
pub(crate) fn render_into(
    out: &mut [f32],
    sample_rate: u32,
    frequency: f64,
    duration: f64,
    waveform: Waveform,
    envelope: Envelope,
) {
    let rate = sample_rate as f64;
    for (i, sample) in out.iter_mut().enumerate() {
        let t = i as f64 / rate;
        let value = waveform.value_at(frequency, t) * envelope.gain(t, duration) * OUTPUT_GAIN;
        *sample = value as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_length_matches_duration() {
        let buffer = synthesize(44_100, 440.0, 0.35, Waveform::Sine).unwrap();
        assert_eq!(buffer.len(), 15_435);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.sample_rate(), 44_100);
    }

    #[test]
    fn test_deterministic() {
        for waveform in Waveform::ALL {
            let a = synthesize(48_000, 523.25, 0.2, waveform).unwrap();
            let b = synthesize(48_000, 523.25, 0.2, waveform).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_envelope_silences_edges() {
        for waveform in Waveform::ALL {
            let buffer = synthesize(44_100, 600.0, 0.35, waveform).unwrap();
            let samples = buffer.samples();
            assert!(samples[0].abs() < 1e-6, "{} starts at {}", waveform, samples[0]);
            let last = samples[samples.len() - 1];
            assert!(last.abs() < 1e-3, "{} ends at {}", waveform, last);
        }
    }

    #[test]
    fn test_attenuated_peak() {
        let buffer = synthesize(44_100, 440.0, 1.0, Waveform::Square).unwrap();
        assert!((buffer.peak() - OUTPUT_GAIN as f32).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            synthesize(44_100, 0.0, 0.1, Waveform::Sine),
            Err(SynthError::InvalidFrequency(_))
        ));
        assert!(matches!(
            synthesize(44_100, 440.0, -1.0, Waveform::Sine),
            Err(SynthError::InvalidDuration(_))
        ));
        assert!(matches!(
            synthesize(44_100, f64::NAN, 0.1, Waveform::Sine),
            Err(SynthError::InvalidFrequency(_))
        ));
        assert!(matches!(
            synthesize(0, 440.0, 0.1, Waveform::Sine),
            Err(SynthError::InvalidSampleRate)
        ));
        // Shorter than one sample
        assert!(matches!(
            synthesize(8_000, 440.0, 1e-6, Waveform::Sine),
            Err(SynthError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_duration() {
        assert!(matches!(
            synthesize(44_100, 440.0, 1e15, Waveform::Sine),
            Err(SynthError::InvalidDuration(d)) if d == 1e15
        ));
        assert!(matches!(
            synthesize(u32::MAX, 440.0, 60.0, Waveform::Sine),
            Err(SynthError::InvalidDuration(_))
        ));
        // One sample over the limit at 1 Hz
        assert!(synthesize(1, 0.1, MAX_SAMPLES as f64 + 1.0, Waveform::Sine).is_err());
    }

    fn waveform_strategy() -> impl Strategy<Value = Waveform> {
        prop::sample::select(Waveform::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_length_is_rounded_rate_times_duration(
            rate in prop::sample::select(vec![8_000u32, 22_050, 44_100, 48_000]),
            frequency in 20.0f64..4_000.0,
            duration in 0.01f64..1.0,
            waveform in waveform_strategy(),
        ) {
            let buffer = synthesize(rate, frequency, duration, waveform).unwrap();
            prop_assert_eq!(buffer.len(), (rate as f64 * duration).round() as usize);
        }

        #[test]
        fn prop_samples_bounded_by_output_gain(
            frequency in 20.0f64..4_000.0,
            duration in 0.01f64..0.5,
            waveform in waveform_strategy(),
        ) {
            let buffer = synthesize(22_050, frequency, duration, waveform).unwrap();
            prop_assert!(buffer.peak() <= OUTPUT_GAIN as f32 + 1e-6);
            prop_assert!(buffer.samples()[0].abs() < 1e-6);
        }
    }
}
