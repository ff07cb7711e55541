//! Renders one audio file to a PNG waveform.
//!
//! Usage: render_waveform <input> <output.png> [width] [height]

use std::path::PathBuf;
use tracing::{error, info};
use waveform_player::app_state::AppState;
use waveform_player::audio::AudioSource;
use waveform_player::config::Settings;
use waveform_player::player::LoadOutcome;
use waveform_player::prelude::*;
use waveform_player::error::ConfigError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output) = match (args.first(), args.get(1)) {
        (Some(input), Some(output)) => (input.clone(), PathBuf::from(output)),
        _ => {
            error!("usage: render_waveform <input> <output.png> [width] [height]");
            return Err(ConfigError::InvalidValue("missing input or output path".into()).into());
        }
    };

    let settings = Settings::new()?;
    let width = parse_dimension(args.get(2), settings.player.surface_width)?;
    let height = parse_dimension(args.get(3), settings.player.surface_height)?;

    let source = if input.starts_with("http://") || input.starts_with("https://") {
        AudioSource::Url(input)
    } else {
        AudioSource::File(PathBuf::from(input))
    };

    let state = AppState::new(settings)?;
    let player = state.new_player(width, height, source.extension());
    match player.load(source).await {
        LoadOutcome::TrueWaveform => info!("Rendered amplitude waveform"),
        LoadOutcome::Fallback { reason } => info!("Rendered fallback waveform ({})", reason),
        LoadOutcome::Superseded => {
            return Err(ConfigError::InvalidValue("load was superseded".into()).into())
        }
    }

    let png = player.with_surface(|surface| surface.to_png())?;
    std::fs::write(&output, png)?;
    info!("Wrote {}", output.display());
    player.teardown();
    Ok(())
}

fn parse_dimension(arg: Option<&String>, default: u32) -> Result<u32> {
    match arg {
        None => Ok(default),
        Some(value) => value
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| ConfigError::InvalidValue(format!("invalid dimension {value:?}")).into()),
    }
}
