//! Decoding compressed or container audio into buffers using Symphonia

use crate::{AudioError, Result, SoundBuffer};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// File extension of a path or URL, used as a format hint
pub fn extension_of(location: &str) -> Option<&str> {
    let path = location
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or(location);
    Path::new(path).extension().and_then(|ext| ext.to_str())
}

/// Decode a whole audio file held in memory
///
/// Samples are interleaved by channel. A file that decodes to nothing is
/// treated as an error.
pub fn decode_bytes(data: Vec<u8>, extension: Option<&str>) -> Result<SoundBuffer> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::DecodeError(format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::DecodeError("No valid audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeError(format!("Failed to create decoder: {}", e)))?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count() as u16);
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AudioError::DecodeError(format!("Format error: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count() as u16);

                let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                interleaved.copy_interleaved_ref(decoded);
                samples.extend_from_slice(interleaved.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet: {}", e);
            }
            Err(e) => {
                return Err(AudioError::DecodeError(format!(
                    "Failed to decode packet: {}",
                    e
                )));
            }
        }
    }

    if samples.is_empty() {
        return Err(AudioError::DecodeError("No audio samples decoded".to_string()));
    }

    let sample_rate = sample_rate
        .ok_or_else(|| AudioError::DecodeError("Unknown sample rate".to_string()))?;

    Ok(SoundBuffer::new(sample_rate, channels.unwrap_or(1), samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_synth::{encode_wav, synthesize, Waveform};

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("animals/cat.mp3"), Some("mp3"));
        assert_eq!(extension_of("https://cdn.test/animals/dog-ar.ogg?v=2"), Some("ogg"));
        assert_eq!(extension_of("animals/cat"), None);
    }

    #[test]
    fn test_decode_wav() {
        let tone = synthesize(22_050, 440.0, 0.2, Waveform::Sine).unwrap();
        let bytes = encode_wav(&tone).unwrap();

        let decoded = decode_bytes(bytes, Some("wav")).unwrap();
        assert_eq!(decoded.sample_rate(), 22_050);
        assert_eq!(decoded.channels(), 1);
        assert_eq!(decoded.len(), tone.len());

        // 16-bit quantization error only
        for (a, b) in decoded.samples().iter().zip(tone.samples()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_decode_ignores_misleading_hint() {
        let tone = synthesize(8_000, 300.0, 0.1, Waveform::Triangle).unwrap();
        let bytes = encode_wav(&tone).unwrap();
        let decoded = decode_bytes(bytes, Some("mp3")).unwrap();
        assert_eq!(decoded.len(), tone.len());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_bytes(b"definitely not audio".to_vec(), Some("mp3"));
        assert!(matches!(result, Err(AudioError::DecodeError(_))));

        let result = decode_bytes(Vec::new(), None);
        assert!(result.is_err());
    }
}
