//! Deterministic sound synthesis for Chirp
//!
//! This crate turns a handful of numbers into ready-to-play PCM buffers.
//! Everything here is pure: the same inputs always produce bit-identical
//! output, which is what lets the playback engine cache buffers by name.
//!
//! # Examples
//!
//! ```
//! use chirp_synth::{sequence, synthesize, Waveform};
//!
//! let click = synthesize(44_100, 800.0, 0.1, Waveform::Sine).unwrap();
//! assert_eq!(click.len(), 4_410);
//!
//! let fanfare = sequence(44_100, &[523.25, 659.25, 783.99], 0.15).unwrap();
//! assert_eq!(fanfare.len(), 19_845);
//! ```
//!
//! # Main Components
//!
//! - **SoundBuffer**: immutable mono/multichannel PCM samples in [-1, 1]
//! - **Waveform**: the four oscillator shapes
//! - **Envelope**: the click-free fade applied to every tone and note
//! - **synthesize / sequence**: single tones and note phrases
//! - **SoundRecipe**: a serializable description of either
//! - **wav**: 16-bit PCM container encoding

pub mod buffer;
pub mod envelope;
pub mod error;
pub mod melody;
pub mod recipe;
pub mod synth;
pub mod wav;
pub mod waveform;

pub use buffer::SoundBuffer;
pub use envelope::Envelope;
pub use error::{Result, SynthError};
pub use melody::{sequence, sequence_with_waveform};
pub use recipe::SoundRecipe;
pub use synth::{sample_count, synthesize, MAX_SAMPLES, OUTPUT_GAIN};
pub use wav::{encode_wav, write_wav};
pub use waveform::Waveform;
