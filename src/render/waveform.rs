use super::commands::{DrawCommand, DrawList, LinearGradient, Point, Rgba};
use crate::audio::AmplitudeProfile;
use crate::config::StyleSettings;
use crate::error::ConfigError;

/// Share of the half-height the loudest bucket reaches.
const AMPLITUDE_HEADROOM: f64 = 0.8;

/// Colours and widths shared by both rendering paths.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformStyle {
    pub color: Rgba,
    pub true_stroke_width: f64,
    pub fallback_stroke_width: f64,
    pub band_edge_alpha: f64,
    pub band_center_alpha: f64,
    pub fallback_top_alpha: f64,
    pub fallback_bottom_alpha: f64,
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            color: Rgba::rgb(99, 102, 241),
            true_stroke_width: 2.0,
            fallback_stroke_width: 3.0,
            band_edge_alpha: 0.3,
            band_center_alpha: 0.1,
            fallback_top_alpha: 0.3,
            fallback_bottom_alpha: 0.05,
        }
    }
}

impl TryFrom<&StyleSettings> for WaveformStyle {
    type Error = ConfigError;

    fn try_from(settings: &StyleSettings) -> Result<Self, Self::Error> {
        let color = Rgba::from_hex(&settings.color)
            .ok_or_else(|| ConfigError::InvalidValue(format!("invalid colour {:?}", settings.color)))?;
        Ok(Self {
            color,
            true_stroke_width: settings.true_stroke_width,
            fallback_stroke_width: settings.fallback_stroke_width,
            band_edge_alpha: settings.band_edge_alpha,
            band_center_alpha: settings.band_center_alpha,
            fallback_top_alpha: settings.fallback_top_alpha,
            fallback_bottom_alpha: settings.fallback_bottom_alpha,
        })
    }
}

/// Pure functions from (profile, size) to drawing commands.
#[derive(Debug, Clone)]
pub struct WaveformRenderer {
    style: WaveformStyle,
    fallback_points: usize,
}

impl Default for WaveformRenderer {
    fn default() -> Self {
        Self::new(WaveformStyle::default(), 200)
    }
}

impl WaveformRenderer {
    pub fn new(style: WaveformStyle, fallback_points: usize) -> Self {
        Self {
            style,
            fallback_points: fallback_points.max(1),
        }
    }

    /// Mirrored band: upper and lower traces stroked, then the region
    /// between them filled with a 3-stop vertical gradient.
    pub fn render_true_waveform(&self, profile: &AmplitudeProfile, width: u32, height: u32) -> DrawList {
        let (w, h) = (width as f64, height as f64);
        let center_y = h / 2.0;
        let scale = center_y * AMPLITUDE_HEADROOM;
        let count = profile.len().max(1) as f64;

        let offsets: Vec<(f64, f64)> = profile
            .normalized()
            .into_iter()
            .enumerate()
            .map(|(i, amplitude)| (i as f64 / count * w, amplitude as f64 * scale))
            .collect();

        let upper: Vec<Point> = offsets
            .iter()
            .map(|&(x, a)| Point::new(x, center_y - a))
            .collect();
        let lower: Vec<Point> = offsets
            .iter()
            .map(|&(x, a)| Point::new(x, center_y + a))
            .collect();

        let mut band = Vec::with_capacity(upper.len() + lower.len() + 1);
        band.push(Point::new(0.0, center_y));
        band.extend(upper.iter().copied());
        band.extend(lower.iter().rev().copied());

        let style = &self.style;
        let gradient = LinearGradient::vertical(0.0, h)
            .stop(0.0, style.color.with_alpha(style.band_edge_alpha))
            .stop(0.5, style.color.with_alpha(style.band_center_alpha))
            .stop(1.0, style.color.with_alpha(style.band_edge_alpha));

        let mut list = DrawList::new();
        list.push(DrawCommand::Clear { width, height });
        list.push(DrawCommand::StrokePath {
            points: upper,
            color: style.color,
            line_width: style.true_stroke_width,
        });
        list.push(DrawCommand::StrokePath {
            points: lower,
            color: style.color,
            line_width: style.true_stroke_width,
        });
        list.push(DrawCommand::FillPath {
            points: band,
            gradient,
        });
        list
    }

    /// Decorative two-sine curve used when no real amplitude data exists.
    pub fn render_fallback_waveform(&self, width: u32, height: u32) -> DrawList {
        let (w, h) = (width as f64, height as f64);
        let center_y = h / 2.0;
        let amplitude = h / 3.0;
        let points = self.fallback_points;

        let curve: Vec<Point> = (0..=points)
            .map(|i| {
                let step = i as f64;
                let x = step / points as f64 * w;
                let y = center_y
                    + (step * 0.2).sin() * amplitude * 0.4
                    + (step * 0.5).sin() * amplitude * 0.2;
                Point::new(x, y)
            })
            .collect();

        let mut area = Vec::with_capacity(curve.len() + 2);
        area.push(Point::new(0.0, center_y));
        area.extend(curve.iter().copied());
        area.push(Point::new(w, center_y));

        let style = &self.style;
        let gradient = LinearGradient::vertical(0.0, h)
            .stop(0.0, style.color.with_alpha(style.fallback_top_alpha))
            .stop(1.0, style.color.with_alpha(style.fallback_bottom_alpha));

        let mut list = DrawList::new();
        list.push(DrawCommand::Clear { width, height });
        list.push(DrawCommand::StrokePath {
            points: curve,
            color: style.color,
            line_width: style.fallback_stroke_width,
        });
        list.push(DrawCommand::FillPath {
            points: area,
            gradient,
        });
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{compute_amplitude_profile, BUCKET_COUNT};
    use test_case::test_case;

    fn renderer() -> WaveformRenderer {
        WaveformRenderer::new(WaveformStyle::default(), 200)
    }

    fn ramp_profile() -> AmplitudeProfile {
        let samples: Vec<f32> = (0..100_000).map(|i| (i as f32 / 100_000.0) * if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        compute_amplitude_profile(&samples, BUCKET_COUNT)
    }

    fn paths(list: &DrawList) -> Vec<&Vec<Point>> {
        list.iter()
            .filter_map(|c| match c {
                DrawCommand::StrokePath { points, .. } | DrawCommand::FillPath { points, .. } => Some(points),
                DrawCommand::Clear { .. } => None,
            })
            .collect()
    }

    #[test]
    fn true_waveform_is_mirrored_about_the_centre() {
        let list = renderer().render_true_waveform(&ramp_profile(), 400, 100);
        let paths = paths(&list);
        let (upper, lower) = (paths[0], paths[1]);
        assert_eq!(upper.len(), BUCKET_COUNT);
        for (u, l) in upper.iter().zip(lower.iter()) {
            assert_eq!(u.x, l.x);
            assert!(((50.0 - u.y) - (l.y - 50.0)).abs() < 1e-9);
        }
        // The loudest bucket reaches 80% of the half-height.
        let peak = upper.iter().map(|p| 50.0 - p.y).fold(0.0, f64::max);
        assert!((peak - 40.0).abs() < 1e-6);
    }

    #[test]
    fn band_is_upper_forward_then_lower_reversed() {
        let list = renderer().render_true_waveform(&ramp_profile(), 300, 90);
        let paths = paths(&list);
        let band = paths[2];
        assert_eq!(band.len(), 2 * BUCKET_COUNT + 1);
        assert_eq!(band[0], Point::new(0.0, 45.0));
        assert_eq!(band[1], paths[0][0]);
        assert_eq!(band[BUCKET_COUNT], paths[0][BUCKET_COUNT - 1]);
        assert_eq!(band[BUCKET_COUNT + 1], paths[1][BUCKET_COUNT - 1]);
        assert_eq!(*band.last().unwrap(), paths[1][0]);
    }

    #[test_case(200, 50)]
    #[test_case(800, 120)]
    #[test_case(1920, 300)]
    fn resizing_scales_geometry_without_changing_topology(width: u32, height: u32) {
        let profile = ramp_profile();
        let base = renderer().render_true_waveform(&profile, 100, 40);
        let resized = renderer().render_true_waveform(&profile, width, height);

        assert_eq!(base.len(), resized.len());
        assert_eq!(base.vertex_count(), resized.vertex_count());
        let factor = width as f64 / 100.0;
        for (a, b) in paths(&base).into_iter().zip(paths(&resized)) {
            for (p, q) in a.iter().zip(b.iter()) {
                assert!((p.x * factor - q.x).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn silent_profile_renders_a_flat_finite_line() {
        let profile = compute_amplitude_profile(&vec![0.0; 5000], BUCKET_COUNT);
        let list = renderer().render_true_waveform(&profile, 640, 80);
        assert!(list.is_finite());
        for path in paths(&list) {
            assert!(path.iter().all(|p| p.y == 40.0));
        }
    }

    #[test]
    fn fallback_is_deterministic_and_sine_shaped() {
        let a = renderer().render_fallback_waveform(600, 90);
        let b = renderer().render_fallback_waveform(600, 90);
        assert_eq!(a, b);

        let paths = paths(&a);
        let curve = paths[0];
        assert_eq!(curve.len(), 201);
        let amplitude = 30.0;
        let expected = 45.0 + (7.0f64 * 0.2).sin() * amplitude * 0.4 + (7.0f64 * 0.5).sin() * amplitude * 0.2;
        assert!((curve[7].y - expected).abs() < 1e-9);
        assert_eq!(curve[200].x, 600.0);

        let area = paths[1];
        assert_eq!(area.len(), 203);
        assert_eq!(area[0], Point::new(0.0, 45.0));
        assert_eq!(*area.last().unwrap(), Point::new(600.0, 45.0));
    }

    #[test]
    fn gradients_follow_the_style() {
        let list = renderer().render_true_waveform(&ramp_profile(), 100, 100);
        let gradient = list
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillPath { gradient, .. } => Some(gradient),
                _ => None,
            })
            .unwrap();
        assert_eq!(gradient.stops.len(), 3);
        assert_eq!(gradient.stops[1].color.a, 0.1);
    }
}
