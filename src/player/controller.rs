use super::playback::Playback;
use super::time::format_duration;
use crate::audio::codec::AudioDecoder;
use crate::audio::{compute_amplitude_profile, AmplitudeProfile, AudioSource, BUCKET_COUNT};
use crate::error::{AudioError, Error, RenderError};
use crate::render::{ProgressOverlay, Surface, WaveformRenderer};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Per-asset pipeline position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPhase {
    Idle,
    MetadataLoaded,
    DecodingInFlight,
    ProfileReady,
    TrueWaveformDrawn,
    DecodingFailed,
    FallbackWaveformDrawn,
    TornDown,
}

/// Which drawing path a render used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPath {
    TrueWaveform,
    Fallback,
}

/// How a `load()` call resolved. Never an error: decode problems degrade
/// to the fallback waveform.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    TrueWaveform,
    Fallback { reason: String },
    /// A newer load or a teardown replaced this asset before it finished.
    Superseded,
}

#[derive(Debug)]
struct Asset {
    description: String,
    profile: Option<Arc<AmplitudeProfile>>,
    degraded: bool,
}

#[derive(Debug)]
struct PlayerState {
    generation: u64,
    phase: PlayerPhase,
    asset: Option<Asset>,
    overlay: ProgressOverlay,
    time_display: (String, String),
    torn_down: bool,
}

struct PlayerInner<S> {
    state: Mutex<PlayerState>,
    surface: Mutex<S>,
    playback: Arc<dyn Playback>,
    decoder: Arc<dyn AudioDecoder>,
    renderer: WaveformRenderer,
    bucket_count: usize,
    draws: AtomicU64,
    timer_ticks: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One waveform player: owns a surface, a playback transport and the
/// current asset slot. Every `load()` takes a new generation; completions
/// from older generations are dropped without drawing.
pub struct WaveformPlayer<S: Surface + 'static> {
    inner: Arc<PlayerInner<S>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

pub struct PlayerBuilder<S> {
    surface: S,
    playback: Arc<dyn Playback>,
    decoder: Arc<dyn AudioDecoder>,
    renderer: WaveformRenderer,
    bucket_count: usize,
}

impl<S: Surface + 'static> PlayerBuilder<S> {
    pub fn renderer(mut self, renderer: WaveformRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn playback(mut self, playback: Arc<dyn Playback>) -> Self {
        self.playback = playback;
        self
    }

    pub fn bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count.max(1);
        self
    }

    pub fn build(self) -> WaveformPlayer<S> {
        WaveformPlayer {
            inner: Arc::new(PlayerInner {
                state: Mutex::new(PlayerState {
                    generation: 0,
                    phase: PlayerPhase::Idle,
                    asset: None,
                    overlay: ProgressOverlay::default(),
                    time_display: (format_duration(Duration::ZERO), format_duration(Duration::ZERO)),
                    torn_down: false,
                }),
                surface: Mutex::new(self.surface),
                playback: self.playback,
                decoder: self.decoder,
                renderer: self.renderer,
                bucket_count: self.bucket_count,
                draws: AtomicU64::new(0),
                timer_ticks: AtomicU64::new(0),
            }),
            timer: Mutex::new(None),
        }
    }
}

impl<S: Surface + 'static> WaveformPlayer<S> {
    pub fn builder(surface: S) -> PlayerBuilder<S> {
        PlayerBuilder {
            surface,
            playback: Arc::new(super::ClockPlayback::new()),
            decoder: Arc::new(crate::audio::codec::ProbingDecoder::default()),
            renderer: WaveformRenderer::default(),
            bucket_count: BUCKET_COUNT,
        }
    }

    /// Replaces the current asset and runs fetch, decode and render.
    /// Decode and fetch failures resolve to the fallback waveform.
    pub async fn load(&self, source: impl Into<AudioSource>) -> LoadOutcome {
        let source = source.into();
        let Some(generation) = self.inner.begin_load(&source) else {
            return LoadOutcome::Superseded;
        };

        match source.fetch().await {
            Ok(bytes) => {
                self.off_runtime(generation, move |inner| inner.decode_and_draw(generation, &bytes))
                    .await
            }
            Err(e) => {
                let error = Error::from(e);
                self.off_runtime(generation, move |inner| inner.fall_back(generation, error))
                    .await
            }
        }
    }

    /// Decoding and rasterizing block, so both run on the blocking pool.
    async fn off_runtime<F>(&self, generation: u64, task: F) -> LoadOutcome
    where
        F: FnOnce(&PlayerInner<S>) -> LoadOutcome + Send + 'static,
    {
        let inner = self.inner.clone();
        match tokio::task::spawn_blocking(move || task(&inner)).await {
            Ok(outcome) => outcome,
            Err(e) => self
                .inner
                .abandon(generation, AudioError::DecodeTask(e.to_string()).into()),
        }
    }

    /// Redraws the current asset at the surface's present size. Rasterizes on
    /// the calling thread.
    pub fn render(&self) -> Result<Option<RenderPath>, RenderError> {
        let mut state = lock(&self.inner.state);
        self.inner.draw(&mut state)
    }

    /// Updates only the progress overlay; the waveform is not recomputed.
    pub fn set_playback_fraction(&self, fraction: f64) -> ProgressOverlay {
        self.inner.apply_overlay(ProgressOverlay::new(fraction))
    }

    /// Click-to-seek on the overlay.
    pub fn seek_to_fraction(&self, fraction: f64) -> ProgressOverlay {
        let overlay = ProgressOverlay::new(fraction);
        if let Some(duration) = self.inner.playback.duration() {
            self.inner
                .playback
                .seek(duration.mul_f64(overlay.fraction()));
        }
        self.inner.apply_overlay(overlay)
    }

    pub fn toggle_play_pause(&self) -> bool {
        let playback = &self.inner.playback;
        if playback.is_playing() {
            playback.pause();
        } else {
            playback.play();
        }
        playback.is_playing()
    }

    pub fn set_volume(&self, volume: f32) {
        self.inner.playback.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.inner.playback.volume()
    }

    /// Spawns the periodic position poll on the current tokio runtime,
    /// replacing any running timer.
    pub fn start_progress_timer(&self, interval: Duration) {
        if lock(&self.inner.state).torn_down {
            return;
        }
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if !inner.tick() {
                    break;
                }
            }
        });

        if let Some(previous) = lock(&self.timer).replace(handle) {
            previous.abort();
        }
    }

    /// Stops the timer, releases the transport and discards the asset.
    /// In-flight loads resolve as `Superseded`. Safe to call repeatedly.
    pub fn teardown(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }

        let mut state = lock(&self.inner.state);
        if state.torn_down {
            return;
        }
        state.torn_down = true;
        state.generation += 1;
        state.asset = None;
        state.phase = PlayerPhase::TornDown;
        drop(state);

        self.inner.playback.stop();
        info!("Player torn down");
    }

    pub fn phase(&self) -> PlayerPhase {
        lock(&self.inner.state).phase
    }

    /// True when the current asset is shown with the synthetic waveform.
    pub fn is_degraded(&self) -> bool {
        lock(&self.inner.state)
            .asset
            .as_ref()
            .is_some_and(|asset| asset.degraded)
    }

    pub fn profile(&self) -> Option<Arc<AmplitudeProfile>> {
        lock(&self.inner.state)
            .asset
            .as_ref()
            .and_then(|asset| asset.profile.clone())
    }

    pub fn overlay(&self) -> ProgressOverlay {
        lock(&self.inner.state).overlay
    }

    /// `(current, total)` as `m:ss`, refreshed by the progress timer.
    pub fn time_display(&self) -> (String, String) {
        lock(&self.inner.state).time_display.clone()
    }

    pub fn playback(&self) -> &Arc<dyn Playback> {
        &self.inner.playback
    }

    pub fn draw_count(&self) -> u64 {
        self.inner.draws.load(Ordering::Relaxed)
    }

    pub fn timer_ticks(&self) -> u64 {
        self.inner.timer_ticks.load(Ordering::Relaxed)
    }

    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.inner.surface))
    }

    pub fn with_surface_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut lock(&self.inner.surface))
    }
}

impl<S: Surface + 'static> Drop for WaveformPlayer<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: Surface> PlayerInner<S> {
    fn begin_load(&self, source: &AudioSource) -> Option<u64> {
        let mut state = lock(&self.state);
        if state.torn_down {
            warn!("Ignoring load of {} on a torn-down player", source.describe());
            return None;
        }
        state.generation += 1;
        state.phase = PlayerPhase::Idle;
        state.asset = Some(Asset {
            description: source.describe(),
            profile: None,
            degraded: false,
        });
        state.overlay = ProgressOverlay::default();
        let generation = state.generation;
        drop(state);

        self.playback.load_asset(None);
        debug!("Loading {} as generation {}", source.describe(), generation);
        Some(generation)
    }

    fn is_current(state: &PlayerState, generation: u64) -> bool {
        !state.torn_down && state.generation == generation
    }

    /// Runs on the blocking pool: header duration, decode, profile, draw.
    fn decode_and_draw(&self, generation: u64, bytes: &[u8]) -> LoadOutcome {
        match self.decoder.probe_duration(bytes) {
            Some(duration) => {
                if !self.metadata_loaded(generation, duration) {
                    return LoadOutcome::Superseded;
                }
            }
            None => debug!("Duration unknown until the asset is decoded"),
        }
        if !self.advance(generation, PlayerPhase::DecodingInFlight) {
            return LoadOutcome::Superseded;
        }

        let decoded = self.decoder.decode(bytes).map(|audio| {
            let profile = compute_amplitude_profile(audio.first_channel(), self.bucket_count);
            (profile, audio.duration())
        });
        match decoded {
            Ok((profile, duration)) => self.complete(generation, profile, duration),
            Err(e) => self.fall_back(generation, e),
        }
    }

    fn metadata_loaded(&self, generation: u64, duration: Duration) -> bool {
        let mut state = lock(&self.state);
        if !Self::is_current(&state, generation) {
            debug!("Discarding metadata for a replaced asset");
            return false;
        }
        state.phase = PlayerPhase::MetadataLoaded;
        state.time_display.1 = format_duration(duration);
        self.playback.load_asset(Some(duration));
        debug!("Player phase -> MetadataLoaded ({:.2}s)", duration.as_secs_f64());
        true
    }

    fn advance(&self, generation: u64, phase: PlayerPhase) -> bool {
        let mut state = lock(&self.state);
        if !Self::is_current(&state, generation) {
            debug!("Discarding stale transition to {:?}", phase);
            return false;
        }
        debug!("Player phase {:?} -> {:?}", state.phase, phase);
        state.phase = phase;
        true
    }

    fn complete(&self, generation: u64, profile: AmplitudeProfile, duration: Duration) -> LoadOutcome {
        let mut state = lock(&self.state);
        if !Self::is_current(&state, generation) {
            debug!("Discarding decoded profile for a replaced asset");
            return LoadOutcome::Superseded;
        }
        if let Some(asset) = state.asset.as_mut() {
            asset.profile = Some(Arc::new(profile));
            asset.degraded = false;
        }
        state.phase = PlayerPhase::ProfileReady;
        if self.playback.duration().is_none() {
            state.time_display.1 = format_duration(duration);
            self.playback.load_asset(Some(duration));
        }

        match self.draw(&mut state) {
            Ok(_) => info!(
                "Rendered waveform for {} ({:.2}s of audio)",
                Self::description(&state),
                duration.as_secs_f64()
            ),
            Err(e) => warn!("Failed to draw waveform: {}", e),
        }
        LoadOutcome::TrueWaveform
    }

    fn fall_back(&self, generation: u64, error: Error) -> LoadOutcome {
        let mut state = lock(&self.state);
        if !Self::is_current(&state, generation) {
            debug!("Discarding failure for a replaced asset: {}", error);
            return LoadOutcome::Superseded;
        }
        warn!(
            "Could not decode {}, using simplified waveform: {}",
            Self::description(&state),
            error
        );
        if let Some(asset) = state.asset.as_mut() {
            asset.profile = None;
            asset.degraded = true;
        }
        state.phase = PlayerPhase::DecodingFailed;

        if let Err(e) = self.draw(&mut state) {
            warn!("Failed to draw fallback waveform: {}", e);
        }
        LoadOutcome::Fallback {
            reason: error.to_string(),
        }
    }

    /// Marks the asset degraded without drawing, for when the pipeline task
    /// itself died.
    fn abandon(&self, generation: u64, error: Error) -> LoadOutcome {
        let mut state = lock(&self.state);
        if !Self::is_current(&state, generation) {
            return LoadOutcome::Superseded;
        }
        warn!("Waveform pipeline for {} failed: {}", Self::description(&state), error);
        if let Some(asset) = state.asset.as_mut() {
            asset.profile = None;
            asset.degraded = true;
        }
        state.phase = PlayerPhase::DecodingFailed;
        LoadOutcome::Fallback {
            reason: error.to_string(),
        }
    }

    fn description(state: &PlayerState) -> &str {
        state
            .asset
            .as_ref()
            .map_or("", |asset| asset.description.as_str())
    }

    /// Draws whatever the current asset supports. Caller holds the state lock.
    fn draw(&self, state: &mut PlayerState) -> Result<Option<RenderPath>, RenderError> {
        if state.torn_down {
            return Ok(None);
        }
        let Some(asset) = state.asset.as_ref() else {
            return Ok(None);
        };

        let mut surface = lock(&self.surface);
        let (width, height) = surface.size();
        let (list, path) = match (&asset.profile, asset.degraded) {
            (Some(profile), false) => (
                self.renderer.render_true_waveform(profile, width, height),
                RenderPath::TrueWaveform,
            ),
            (_, true) => (
                self.renderer.render_fallback_waveform(width, height),
                RenderPath::Fallback,
            ),
            (None, false) => return Ok(None),
        };
        surface.draw(&list)?;
        surface.set_overlay(state.overlay);
        drop(surface);

        self.draws.fetch_add(1, Ordering::Relaxed);
        state.phase = match path {
            RenderPath::TrueWaveform => PlayerPhase::TrueWaveformDrawn,
            RenderPath::Fallback => PlayerPhase::FallbackWaveformDrawn,
        };
        Ok(Some(path))
    }

    fn apply_overlay(&self, overlay: ProgressOverlay) -> ProgressOverlay {
        let mut state = lock(&self.state);
        if state.torn_down {
            return state.overlay;
        }
        state.overlay = overlay;
        lock(&self.surface).set_overlay(overlay);
        overlay
    }

    /// One timer poll. Returns false once the player is torn down.
    fn tick(&self) -> bool {
        let mut state = lock(&self.state);
        if state.torn_down {
            return false;
        }
        self.timer_ticks.fetch_add(1, Ordering::Relaxed);

        let overlay = ProgressOverlay::new(self.playback.fraction());
        state.overlay = overlay;
        state.time_display = (
            format_duration(self.playback.position()),
            format_duration(self.playback.duration().unwrap_or_default()),
        );
        lock(&self.surface).set_overlay(overlay);
        true
    }
}
