pub mod controller;
pub mod playback;
pub mod time;

pub use controller::{LoadOutcome, PlayerBuilder, PlayerPhase, RenderPath, WaveformPlayer};
pub use playback::{ClockPlayback, Playback};
pub use time::{format_duration, format_time};
