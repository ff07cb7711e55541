use std::time::Duration;

/// PCM audio after decoding: one sample vector per channel, nominally in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(vec![samples], sample_rate)
    }

    /// Splits interleaved frames into per-channel vectors. Trailing samples
    /// that do not complete a frame are dropped.
    pub fn from_interleaved(samples: &[f32], channel_count: usize, sample_rate: u32) -> Self {
        let channel_count = channel_count.max(1);
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(channels, sample_rate)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn first_channel(&self) -> &[f32] {
        self.channels.first().map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_frames_are_split_per_channel() {
        let audio = DecodedAudio::from_interleaved(&[0.1, -0.1, 0.2, -0.2, 0.3], 2, 8000);
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.channels[0], vec![0.1, 0.2]);
        assert_eq!(audio.channels[1], vec![-0.1, -0.2]);
    }

    #[test]
    fn duration_follows_frames_and_rate() {
        let audio = DecodedAudio::mono(vec![0.0; 44_100 * 2], 44_100);
        assert_eq!(audio.duration(), Duration::from_secs(2));
        assert!(DecodedAudio::mono(Vec::new(), 0).duration().is_zero());
    }
}
