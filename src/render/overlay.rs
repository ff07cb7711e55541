use serde::Serialize;

/// Playback-position indicator laid over the waveform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressOverlay {
    fraction: f64,
}

impl ProgressOverlay {
    /// Clamps into [0, 1]; NaN and infinities reset to 0.
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn width_percent(&self) -> f64 {
        self.fraction * 100.0
    }

    pub fn width_px(&self, container_width: u32) -> f64 {
        self.fraction * container_width as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, 0.0)]
    #[test_case(0.5, 50.0)]
    #[test_case(1.0, 100.0)]
    #[test_case(1.7, 100.0 ; "above one clamps")]
    #[test_case(-0.2, 0.0 ; "negative clamps")]
    #[test_case(f64::NAN, 0.0 ; "nan resets")]
    fn width_tracks_fraction(fraction: f64, percent: f64) {
        let overlay = ProgressOverlay::new(fraction);
        assert_eq!(overlay.width_percent(), percent);
        assert_eq!(overlay.width_px(640), 640.0 * percent / 100.0);
    }
}
