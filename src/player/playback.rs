use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// The audio transport the player widget drives: play/pause/seek/volume
/// plus the position and duration the progress overlay is derived from.
pub trait Playback: Send + Sync + Debug {
    /// Resets the transport for a new asset. `None` means the duration is
    /// not known (e.g. the asset could not be decoded).
    fn load_asset(&self, duration: Option<Duration>);
    fn play(&self);
    fn pause(&self);
    fn is_playing(&self) -> bool;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn seek(&self, position: Duration);
    fn set_volume(&self, volume: f32);
    fn volume(&self) -> f32;
    /// Releases the transport; later calls behave as an unloaded asset.
    fn stop(&self);

    /// Position over duration, 0 when the duration is unknown or zero.
    fn fraction(&self) -> f64 {
        match self.duration() {
            Some(duration) if !duration.is_zero() => {
                self.position().as_secs_f64() / duration.as_secs_f64()
            }
            _ => 0.0,
        }
    }
}

#[derive(Debug)]
struct ClockState {
    duration: Option<Duration>,
    offset: Duration,
    started_at: Option<Instant>,
    volume: f32,
}

impl ClockState {
    fn position(&self) -> Duration {
        let elapsed = self.started_at.map_or(Duration::ZERO, |t| t.elapsed());
        let position = self.offset + elapsed;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

/// Wall-clock transport with no audio device behind it.
#[derive(Debug)]
pub struct ClockPlayback {
    state: Mutex<ClockState>,
}

impl Default for ClockPlayback {
    fn default() -> Self {
        Self {
            state: Mutex::new(ClockState {
                duration: None,
                offset: Duration::ZERO,
                started_at: None,
                volume: 1.0,
            }),
        }
    }
}

impl ClockPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Playback for ClockPlayback {
    fn load_asset(&self, duration: Option<Duration>) {
        let mut state = self.state();
        state.duration = duration;
        state.offset = Duration::ZERO;
        state.started_at = None;
    }

    fn play(&self) {
        let mut state = self.state();
        if state.started_at.is_none() && state.duration.is_some() {
            if Some(state.offset) >= state.duration {
                state.offset = Duration::ZERO;
            }
            state.started_at = Some(Instant::now());
        }
    }

    fn pause(&self) {
        let mut state = self.state();
        state.offset = state.position();
        state.started_at = None;
    }

    fn is_playing(&self) -> bool {
        let state = self.state();
        state.started_at.is_some() && Some(state.position()) < state.duration
    }

    fn position(&self) -> Duration {
        self.state().position()
    }

    fn duration(&self) -> Option<Duration> {
        self.state().duration
    }

    fn seek(&self, position: Duration) {
        let mut state = self.state();
        state.offset = match state.duration {
            Some(duration) => position.min(duration),
            None => Duration::ZERO,
        };
        if state.started_at.is_some() {
            state.started_at = Some(Instant::now());
        }
    }

    fn set_volume(&self, volume: f32) {
        self.state().volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn volume(&self) -> f32 {
        self.state().volume
    }

    fn stop(&self) {
        self.load_asset(None);
    }
}
