use super::commands::{DrawCommand, DrawList, LinearGradient, Point, Rgba};
use crate::error::RenderError;
use plotters::prelude::*;
use tracing::debug;

/// Draws a `DrawList` into a packed RGB8 buffer.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    background: Rgba,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(Rgba::rgb(255, 255, 255))
    }
}

impl Rasterizer {
    pub fn new(background: Rgba) -> Self {
        Self { background }
    }

    pub fn background(&self) -> [u8; 3] {
        [self.background.r, self.background.g, self.background.b]
    }

    pub fn rasterize(&self, list: &DrawList, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptySurface { width, height });
        }
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        self.draw_into(&mut buffer, width, height, list)?;
        Ok(buffer)
    }

    pub fn draw_into(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        list: &DrawList,
    ) -> Result<(), RenderError> {
        let background = RGBColor(self.background.r, self.background.g, self.background.b);
        {
            let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
            root.fill(&background).map_err(backend)?;

            for command in list.iter() {
                match command {
                    DrawCommand::Clear { .. } => root.fill(&background).map_err(backend)?,
                    DrawCommand::StrokePath {
                        points,
                        color,
                        line_width,
                    } => {
                        if points.len() < 2 {
                            continue;
                        }
                        let path: Vec<(i32, i32)> = points.iter().map(to_pixel).collect();
                        let style = plotters_color(*color).stroke_width(line_width.round().max(1.0) as u32);
                        root.draw(&PathElement::new(path, style)).map_err(backend)?;
                    }
                    DrawCommand::FillPath { points, gradient } => {
                        fill_gradient(&root, points, gradient, width, height)?;
                    }
                }
            }

            root.present().map_err(backend)?;
        }

        debug!("Rasterized {} draw commands at {}x{}", list.len(), width, height);
        Ok(())
    }
}

/// Encodes a packed RGB8 buffer as PNG.
pub fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(buffer)?;
    }
    Ok(png_data)
}

fn fill_gradient<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[Point],
    gradient: &LinearGradient,
    width: u32,
    height: u32,
) -> Result<(), RenderError> {
    for (y, spans) in scanline_spans(points, width, height) {
        let color = gradient.color_at(y as f64 + 0.5);
        if color.a <= 0.0 {
            continue;
        }
        let style = plotters_color(color).filled();
        for (x0, x1) in spans {
            root.draw(&Rectangle::new([(x0, y), (x1 - 1, y)], style))
                .map_err(backend)?;
        }
    }
    Ok(())
}

/// Even-odd fill spans per pixel row, sampled at row centres. Spans are
/// half-open `[x0, x1)` and clipped to the surface.
pub(crate) fn scanline_spans(points: &[Point], width: u32, height: u32) -> Vec<(i32, Vec<(i32, i32)>)> {
    if points.len() < 3 {
        return Vec::new();
    }

    let mut rows = Vec::new();
    let mut crossings: Vec<f64> = Vec::new();
    for y in 0..height as i32 {
        let scan_y = y as f64 + 0.5;
        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = &points[(i + 1) % points.len()];
            if (a.y <= scan_y) != (b.y <= scan_y) {
                let t = (scan_y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        let spans: Vec<(i32, i32)> = crossings
            .chunks_exact(2)
            .filter_map(|pair| {
                let x0 = (pair[0].round().max(0.0) as i32).min(width as i32);
                let x1 = (pair[1].round().max(0.0) as i32).min(width as i32);
                (x1 > x0).then_some((x0, x1))
            })
            .collect();
        if !spans.is_empty() {
            rows.push((y, spans));
        }
    }
    rows
}

fn to_pixel(point: &Point) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}

fn plotters_color(color: Rgba) -> RGBAColor {
    RGBColor(color.r, color.g, color.b).mix(color.a)
}

fn backend<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{WaveformRenderer, WaveformStyle};

    fn pixel(buffer: &[u8], width: u32, x: u32, y: u32) -> [u8; 3] {
        let at = ((y * width + x) * 3) as usize;
        [buffer[at], buffer[at + 1], buffer[at + 2]]
    }

    #[test]
    fn rectangle_spans_cover_its_interior() {
        let square = [
            Point::new(2.0, 2.0),
            Point::new(8.0, 2.0),
            Point::new(8.0, 6.0),
            Point::new(2.0, 6.0),
        ];
        let rows = scanline_spans(&square, 10, 10);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|(_, spans)| spans == &vec![(2, 8)]));
        assert_eq!(rows.first().unwrap().0, 2);
        assert_eq!(rows.last().unwrap().0, 5);
    }

    #[test]
    fn spans_are_clipped_to_the_surface() {
        let wide = [
            Point::new(-50.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 2.0),
            Point::new(-50.0, 2.0),
        ];
        let rows = scanline_spans(&wide, 20, 4);
        assert!(rows.iter().all(|(_, spans)| spans == &vec![(0, 20)]));
    }

    #[test]
    fn fallback_waveform_tints_pixels_near_the_centre_line() {
        let renderer = WaveformRenderer::new(WaveformStyle::default(), 200);
        let list = renderer.render_fallback_waveform(200, 60);
        let rasterizer = Rasterizer::default();
        let buffer = rasterizer.rasterize(&list, 200, 60).unwrap();

        assert_eq!(buffer.len(), 200 * 60 * 3);
        // Corners stay background, the curve itself is painted.
        assert_eq!(pixel(&buffer, 200, 0, 0), [255, 255, 255]);
        assert_eq!(pixel(&buffer, 200, 199, 59), [255, 255, 255]);
        let painted = buffer.chunks_exact(3).filter(|px| *px != [255, 255, 255]).count();
        assert!(painted > 200);
    }

    #[test]
    fn empty_surface_is_an_error() {
        let err = Rasterizer::default().rasterize(&DrawList::new(), 0, 10).unwrap_err();
        assert!(matches!(err, RenderError::EmptySurface { .. }));
    }

    #[test]
    fn png_output_has_signature() {
        let buffer = vec![255u8; 4 * 4 * 3];
        let png = encode_png(&buffer, 4, 4).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
