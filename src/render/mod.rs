pub mod commands;
pub mod overlay;
pub mod raster;
pub mod surface;
pub mod waveform;

pub use commands::{DrawCommand, DrawList, GradientStop, LinearGradient, Point, Rgba};
pub use overlay::ProgressOverlay;
pub use raster::{encode_png, Rasterizer};
pub use surface::{PixelSurface, RecordingSurface, Surface};
pub use waveform::{WaveformRenderer, WaveformStyle};
