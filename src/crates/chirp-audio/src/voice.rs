//! Voices and the mixer that sums them
//!
//! A voice is one playing instance of a buffer with its own gain. The
//! device callback asks the [`VoiceMixer`] for a block of output, and the
//! mixer adds every active voice into it.

use crate::SoundBuffer;
use std::sync::Arc;
use tracing::debug;

/// Identifier for a voice inside a mixer
pub type VoiceId = u64;

/// Upper bound on simultaneous voices; the oldest one-shot is dropped first
pub const MAX_VOICES: usize = 64;

/// A single playback instance of a buffer
pub struct Voice {
    /// The buffer being played
    buffer: Arc<SoundBuffer>,
    /// Current playback position (in source frames)
    position: f64,
    /// Gain (0.0 to 1.0)
    gain: f32,
    /// Restart from the beginning when the end is reached
    looping: bool,
    /// Whether this voice still produces sound
    active: bool,
}

impl Voice {
    pub fn new(buffer: Arc<SoundBuffer>) -> Self {
        Voice {
            buffer,
            position: 0.0,
            gain: 1.0,
            looping: false,
            active: true,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.set_gain(gain);
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Add the next output frame into `frame`, one slot per output channel
    ///
    /// Mono sources are copied to every channel. Returns false once the
    /// voice has finished.
    pub fn mix_frame(&mut self, frame: &mut [f32], output_sample_rate: u32) -> bool {
        if !self.active {
            return false;
        }

        let frames = self.buffer.frames();
        if frames == 0 {
            self.active = false;
            return false;
        }

        if self.position >= frames as f64 {
            if self.looping {
                self.position %= frames as f64;
            } else {
                self.active = false;
                return false;
            }
        }

        let source_channels = self.buffer.channels() as usize;
        for (channel, out) in frame.iter_mut().enumerate() {
            let source_channel = if source_channels == 1 {
                0
            } else {
                channel % source_channels
            };
            *out += self.interpolate(self.position, source_channel) * self.gain;
        }

        // Step through the source at its own rate
        let rate_ratio = self.buffer.sample_rate() as f64 / output_sample_rate.max(1) as f64;
        self.position += rate_ratio;

        true
    }

    /// Linear interpolation between the two source frames around `frame_position`
    fn interpolate(&self, frame_position: f64, channel: usize) -> f32 {
        let data = self.buffer.samples();
        let channels = self.buffer.channels() as usize;

        let base_index = (frame_position.floor() as usize) * channels + channel;
        if base_index >= data.len() {
            return 0.0;
        }

        let fraction = (frame_position - frame_position.floor()) as f32;
        let current = data[base_index];

        let next_index = base_index + channels;
        let next = if next_index < data.len() {
            data[next_index]
        } else if self.looping {
            data[channel]
        } else {
            return current;
        };

        current + (next - current) * fraction
    }

    /// Add this voice into an interleaved buffer of `channels` channels
    pub fn fill_buffer(&mut self, buffer: &mut [f32], channels: usize, output_sample_rate: u32) {
        for frame in buffer.chunks_mut(channels.max(1)) {
            if !self.mix_frame(frame, output_sample_rate) {
                break;
            }
        }
    }
}

/// The set of voices currently sounding
#[derive(Default)]
pub struct VoiceMixer {
    voices: Vec<(VoiceId, Voice)>,
    next_id: VoiceId,
}

impl VoiceMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a voice and return its id
    pub fn add(&mut self, voice: Voice) -> VoiceId {
        if self.voices.len() >= MAX_VOICES {
            if let Some(oldest) = self.voices.iter().position(|(_, v)| !v.is_looping()) {
                let (id, _) = self.voices.remove(oldest);
                debug!(voice = id, "Voice limit reached, dropping oldest sound");
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.voices.push((id, voice));
        id
    }

    /// Remove a voice; returns whether it was still present
    pub fn stop(&mut self, id: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|(voice_id, _)| *voice_id != id);
        self.voices.len() != before
    }

    pub fn set_gain(&mut self, id: VoiceId, gain: f32) -> bool {
        match self.voices.iter_mut().find(|(voice_id, _)| *voice_id == id) {
            Some((_, voice)) => {
                voice.set_gain(gain);
                true
            }
            None => false,
        }
    }

    pub fn is_playing(&self, id: VoiceId) -> bool {
        self.voices
            .iter()
            .any(|(voice_id, voice)| *voice_id == id && voice.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Overwrite `buffer` with the sum of all voices, dropping finished ones
    pub fn fill_buffer(&mut self, buffer: &mut [f32], channels: usize, output_sample_rate: u32) {
        buffer.fill(0.0);

        self.voices.retain_mut(|(_, voice)| {
            voice.fill_buffer(buffer, channels, output_sample_rate);
            voice.is_active()
        });

        for sample in buffer.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}
