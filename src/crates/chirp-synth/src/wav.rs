//! 16-bit PCM WAV encoding
//!
//! Background tracks are handed to the output backend as a complete WAV
//! container, the same bytes the CLI writes to disk.

use crate::{Result, SoundBuffer};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Cursor, Seek, Write};
use std::path::Path;

fn spec_for(buffer: &SoundBuffer) -> WavSpec {
    WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn write_samples<W: Write + Seek>(writer: &mut WavWriter<W>, buffer: &SoundBuffer) -> Result<()> {
    // Samples are already interleaved by channel
    for &sample in buffer.samples() {
        // Clamp to prevent wrap-around on overshoot
        writer.write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)?;
    }
    Ok(())
}

/// Encode a buffer as an in-memory WAV file
pub fn encode_wav(buffer: &SoundBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec_for(buffer))?;
        write_samples(&mut writer, buffer)?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Write a buffer to a WAV file on disk
pub fn write_wav(path: impl AsRef<Path>, buffer: &SoundBuffer) -> Result<()> {
    let mut writer = WavWriter::create(path, spec_for(buffer))?;
    write_samples(&mut writer, buffer)?;
    writer.finalize()?;
    Ok(())
}
