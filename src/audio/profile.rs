use serde::Serialize;

/// Number of buckets a waveform is downsampled to.
pub const BUCKET_COUNT: usize = 1000;

/// Mean absolute amplitude per equal-size time slice of one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmplitudeProfile {
    buckets: Vec<f32>,
}

impl AmplitudeProfile {
    pub fn from_buckets(buckets: Vec<f32>) -> Self {
        Self { buckets }
    }

    pub fn values(&self) -> &[f32] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn max(&self) -> f32 {
        self.buckets.iter().copied().fold(0.0, f32::max)
    }

    /// Buckets scaled into [0, 1] by the profile maximum. A silent (or
    /// non-finite) maximum yields all zeros so callers draw a flat line.
    pub fn normalized(&self) -> Vec<f32> {
        let max = self.max();
        if max <= 0.0 || !max.is_finite() {
            return vec![0.0; self.buckets.len()];
        }
        self.buckets
            .iter()
            .map(|&value| if value.is_finite() { value / max } else { 0.0 })
            .collect()
    }
}

/// Downsamples `samples` into `bucket_count` contiguous blocks of
/// `floor(len / bucket_count)` samples each, averaging absolute values.
/// Remainder samples past `bucket_count * block_size` are ignored. With
/// fewer samples than buckets the block size is zero and every bucket is 0.
pub fn compute_amplitude_profile(samples: &[f32], bucket_count: usize) -> AmplitudeProfile {
    let block_size = if bucket_count == 0 {
        0
    } else {
        samples.len() / bucket_count
    };

    if block_size == 0 {
        return AmplitudeProfile::from_buckets(vec![0.0; bucket_count]);
    }

    let buckets = samples
        .chunks_exact(block_size)
        .take(bucket_count)
        .map(|block| block.iter().map(|s| s.abs()).sum::<f32>() / block_size as f32)
        .collect();

    AmplitudeProfile::from_buckets(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1000 ; "exact multiple")]
    #[test_case(1999 ; "remainder just below two blocks")]
    #[test_case(48_000 ; "one second at 48k")]
    #[test_case(441_337 ; "long odd length")]
    fn profile_always_has_bucket_count_values(len: usize) {
        let samples: Vec<f32> = (0..len).map(|i| ((i as f32) * 0.37).sin()).collect();
        let profile = compute_amplitude_profile(&samples, BUCKET_COUNT);
        assert_eq!(profile.len(), BUCKET_COUNT);
        assert!(profile.values().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn silence_yields_zero_buckets() {
        let profile = compute_amplitude_profile(&vec![0.0; 10_000], BUCKET_COUNT);
        assert!(profile.values().iter().all(|&v| v == 0.0));
        assert_eq!(profile.max(), 0.0);
        assert!(profile.normalized().iter().all(|&v| v == 0.0));
    }

    #[test_case(0.25)]
    #[test_case(-0.5)]
    #[test_case(1.0)]
    fn constant_amplitude_is_preserved(amplitude: f32) {
        let profile = compute_amplitude_profile(&vec![amplitude; 12_345], BUCKET_COUNT);
        for &value in profile.values() {
            assert!((value - amplitude.abs()).abs() < 1e-6);
        }
    }

    #[test]
    fn remainder_samples_are_ignored() {
        // 2 blocks of 2 samples; the trailing 9.0 falls outside them.
        let profile = compute_amplitude_profile(&[1.0, -1.0, 0.5, -0.5, 9.0], 2);
        assert_eq!(profile.values(), &[1.0, 0.5]);
    }

    #[test]
    fn fewer_samples_than_buckets_is_flat() {
        let profile = compute_amplitude_profile(&[0.5; 10], BUCKET_COUNT);
        assert_eq!(profile.len(), BUCKET_COUNT);
        assert!(profile.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn computation_is_deterministic() {
        let samples: Vec<f32> = (0..50_000).map(|i| ((i * 7919) % 1000) as f32 / 500.0 - 1.0).collect();
        assert_eq!(
            compute_amplitude_profile(&samples, BUCKET_COUNT),
            compute_amplitude_profile(&samples, BUCKET_COUNT)
        );
    }

    #[test]
    fn normalization_scales_by_max() {
        let profile = AmplitudeProfile::from_buckets(vec![0.1, 0.2, 0.4]);
        assert_eq!(profile.normalized(), vec![0.25, 0.5, 1.0]);
    }
}
