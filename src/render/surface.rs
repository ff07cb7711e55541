use super::commands::{DrawList, Rgba};
use super::overlay::ProgressOverlay;
use super::raster::{encode_png, Rasterizer};
use crate::error::RenderError;

const OVERLAY_ALPHA: f64 = 0.2;

/// A 2D drawing target the player owns exclusively.
pub trait Surface: Send {
    /// Current on-screen size in pixels.
    fn size(&self) -> (u32, u32);

    fn draw(&mut self, list: &DrawList) -> Result<(), RenderError>;

    fn set_overlay(&mut self, overlay: ProgressOverlay);
}

/// Rasterizing surface backed by an RGB8 buffer.
#[derive(Debug)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    rasterizer: Rasterizer,
    overlay_color: Rgba,
    pixels: Vec<u8>,
    overlay: ProgressOverlay,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, rasterizer: Rasterizer, overlay_color: Rgba) -> Self {
        let mut surface = Self {
            width,
            height,
            rasterizer,
            overlay_color,
            pixels: Vec::new(),
            overlay: ProgressOverlay::default(),
        };
        surface.clear();
        surface
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn overlay(&self) -> ProgressOverlay {
        self.overlay
    }

    /// Waveform pixels with the progress tint composited over them.
    pub fn composite(&self) -> Vec<u8> {
        let mut out = self.pixels.clone();
        if self.width == 0 || self.height == 0 {
            return out;
        }
        let tint = self.overlay_color.with_alpha(OVERLAY_ALPHA);
        let columns = (self.overlay.width_px(self.width).round() as usize).min(self.width as usize);
        for row in out.chunks_exact_mut(self.width as usize * 3) {
            for px in row[..columns * 3].chunks_exact_mut(3) {
                px.copy_from_slice(&tint.over([px[0], px[1], px[2]]));
            }
        }
        out
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }
        encode_png(&self.composite(), self.width, self.height)
    }

    fn clear(&mut self) {
        let background = self.rasterizer.background();
        self.pixels = background
            .iter()
            .copied()
            .cycle()
            .take((self.width * self.height * 3) as usize)
            .collect();
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&mut self, list: &DrawList) -> Result<(), RenderError> {
        self.pixels = self.rasterizer.rasterize(list, self.width, self.height)?;
        Ok(())
    }

    fn set_overlay(&mut self, overlay: ProgressOverlay) {
        self.overlay = overlay;
    }
}

/// Keeps every frame and overlay update instead of rasterizing.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    frames: Vec<DrawList>,
    overlays: Vec<ProgressOverlay>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn frames(&self) -> &[DrawList] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&DrawList> {
        self.frames.last()
    }

    pub fn overlays(&self) -> &[ProgressOverlay] {
        &self.overlays
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&mut self, list: &DrawList) -> Result<(), RenderError> {
        self.frames.push(list.clone());
        Ok(())
    }

    fn set_overlay(&mut self, overlay: ProgressOverlay) {
        self.overlays.push(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_tints_only_the_played_columns() {
        let mut surface = PixelSurface::new(10, 2, Rasterizer::default(), Rgba::rgb(0, 0, 0));
        surface.set_overlay(ProgressOverlay::new(0.5));
        let out = surface.composite();

        let column = |x: usize| [out[x * 3], out[x * 3 + 1], out[x * 3 + 2]];
        assert_eq!(column(4), [204, 204, 204]);
        assert_eq!(column(5), [255, 255, 255]);
    }

    #[test]
    fn zero_width_surface_composites_to_nothing() {
        let mut surface = PixelSurface::new(10, 2, Rasterizer::default(), Rgba::rgb(0, 0, 0));
        surface.set_overlay(ProgressOverlay::new(0.5));
        surface.resize(0, 2);

        assert!(surface.pixels().is_empty());
        assert!(surface.composite().is_empty());
        assert_eq!(surface.overlay().fraction(), 0.5);
        assert!(matches!(surface.to_png(), Err(RenderError::EmptySurface { width: 0, .. })));
    }

    #[test]
    fn recording_surface_keeps_history() {
        let mut surface = RecordingSurface::new(100, 20);
        surface.draw(&DrawList::new()).unwrap();
        surface.set_overlay(ProgressOverlay::new(0.25));
        assert_eq!(surface.frames().len(), 1);
        assert_eq!(surface.overlays()[0].fraction(), 0.25);
    }
}
