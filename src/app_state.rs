use crate::audio::codec::ProbingDecoder;
use crate::config::Settings;
use crate::error::{ConfigError, Result};
use crate::player::WaveformPlayer;
use crate::render::{PixelSurface, Rasterizer, Rgba, WaveformRenderer, WaveformStyle};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};
use std::time::SystemTime;
use tracing::info;

pub type Player = WaveformPlayer<PixelSurface>;

/// Everything the service shares between requests. Players are looked up
/// by name instead of living in globals.
pub struct AppState {
    settings: Settings,
    renderer: WaveformRenderer,
    rasterizer: Rasterizer,
    overlay_color: Rgba,
    players: RwLock<HashMap<String, Arc<Player>>>,
    pub start_time: SystemTime,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Arc<Self>> {
        let style = WaveformStyle::try_from(&settings.style)?;
        let background = parse_colour("style.background", &settings.style.background)?;
        let overlay_color = parse_colour("style.overlay", &settings.style.overlay)?;
        let renderer = WaveformRenderer::new(style, settings.waveform.fallback_points);

        info!(
            "Application state ready: {} buckets, {}x{} surfaces",
            settings.waveform.bucket_count, settings.player.surface_width, settings.player.surface_height
        );

        Ok(Arc::new(AppState {
            renderer,
            rasterizer: Rasterizer::new(background),
            overlay_color,
            settings,
            players: RwLock::new(HashMap::new()),
            start_time: SystemTime::now(),
        }))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A fresh pixel surface using the configured colours.
    pub fn surface(&self, width: u32, height: u32) -> PixelSurface {
        PixelSurface::new(width, height, self.rasterizer.clone(), self.overlay_color)
    }

    /// Builds a player wired to the configured renderer and bucket count.
    pub fn new_player(&self, width: u32, height: u32, extension: Option<String>) -> Player {
        let decoder = match extension {
            Some(extension) => ProbingDecoder::with_extension(extension),
            None => ProbingDecoder::default(),
        };
        WaveformPlayer::builder(self.surface(width, height))
            .renderer(self.renderer.clone())
            .decoder(Arc::new(decoder))
            .bucket_count(self.settings.waveform.bucket_count)
            .build()
    }

    pub fn player(&self, name: &str) -> Option<Arc<Player>> {
        self.read_players().get(name).cloned()
    }

    pub fn player_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_players().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registers a player, tearing down any player it replaces.
    pub fn insert_player(&self, name: impl Into<String>, player: Player) -> Arc<Player> {
        let player = Arc::new(player);
        if let Some(previous) = self.write_players().insert(name.into(), player.clone()) {
            previous.teardown();
        }
        player
    }

    pub fn remove_player(&self, name: &str) -> bool {
        match self.write_players().remove(name) {
            Some(player) => {
                player.teardown();
                true
            }
            None => false,
        }
    }

    fn read_players(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Player>>> {
        self.players.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_players(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Player>>> {
        self.players.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_colour(key: &str, value: &str) -> Result<Rgba> {
    Rgba::from_hex(value)
        .ok_or_else(|| ConfigError::InvalidValue(format!("{key}: invalid colour {value:?}")).into())
}
