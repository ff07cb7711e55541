use crate::audio::profile::BUCKET_COUNT;
use crate::error::ConfigError;
use crate::render::Rgba;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub waveform: WaveformSettings,
    pub style: StyleSettings,
    pub player: PlayerSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaveformSettings {
    pub bucket_count: usize,
    pub fallback_points: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyleSettings {
    pub color: String,
    pub background: String,
    pub overlay: String,
    pub true_stroke_width: f64,
    pub fallback_stroke_width: f64,
    /// Alpha at the top and bottom edges of the true waveform band.
    pub band_edge_alpha: f64,
    /// Alpha along the centre line of the true waveform band.
    pub band_center_alpha: f64,
    pub fallback_top_alpha: f64,
    pub fallback_bottom_alpha: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSettings {
    pub progress_interval_ms: u64,
    pub surface_width: u32,
    pub surface_height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults()?
            .add_source(File::new("config/default", FileFormat::Toml).required(false))
            .add_source(File::new(&format!("config/{}", env), FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("WAVEFORM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Built-in values only; no files or environment.
    pub fn built_in() -> Result<Self, ConfigError> {
        let settings: Settings = Self::defaults()?.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads a single TOML document layered over the built-in values.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Self::defaults()?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("waveform.bucket_count", BUCKET_COUNT as u64)?
            .set_default("waveform.fallback_points", 200u64)?
            .set_default("style.color", "#6366f1")?
            .set_default("style.background", "#ffffff")?
            .set_default("style.overlay", "#6366f1")?
            .set_default("style.true_stroke_width", 2.0)?
            .set_default("style.fallback_stroke_width", 3.0)?
            .set_default("style.band_edge_alpha", 0.3)?
            .set_default("style.band_center_alpha", 0.1)?
            .set_default("style.fallback_top_alpha", 0.3)?
            .set_default("style.fallback_bottom_alpha", 0.05)?
            .set_default("player.progress_interval_ms", 250u64)?
            .set_default("player.surface_width", 800u64)?
            .set_default("player.surface_height", 120u64)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000u64)?
            .set_default("server.max_body_bytes", 64u64 * 1024 * 1024)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.waveform.bucket_count == 0 {
            return Err(ConfigError::InvalidValue("waveform.bucket_count must be positive".into()));
        }
        if self.waveform.fallback_points == 0 {
            return Err(ConfigError::InvalidValue("waveform.fallback_points must be positive".into()));
        }
        if self.player.progress_interval_ms == 0 {
            return Err(ConfigError::InvalidValue("player.progress_interval_ms must be positive".into()));
        }
        if self.player.surface_width == 0 || self.player.surface_height == 0 {
            return Err(ConfigError::InvalidValue("player surface size must be non-zero".into()));
        }
        for (key, value) in [
            ("style.color", &self.style.color),
            ("style.background", &self.style.background),
            ("style.overlay", &self.style.overlay),
        ] {
            Rgba::from_hex(value)
                .ok_or_else(|| ConfigError::InvalidValue(format!("{key}: invalid colour {value:?}")))?;
        }
        for (key, alpha) in [
            ("style.band_edge_alpha", self.style.band_edge_alpha),
            ("style.band_center_alpha", self.style.band_center_alpha),
            ("style.fallback_top_alpha", self.style.fallback_top_alpha),
            ("style.fallback_bottom_alpha", self.style.fallback_bottom_alpha),
        ] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(ConfigError::InvalidValue(format!("{key} must be within [0, 1]")));
            }
        }
        Ok(())
    }
}

impl PlayerSettings {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
