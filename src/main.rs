use tracing::info;
use waveform_player::app_state::AppState;
use waveform_player::config::Settings;
use waveform_player::prelude::*;
use waveform_player::server::run_server;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("Starting waveform service");

    let settings = Settings::new()?;
    let app_state = AppState::new(settings)?;

    run_server(app_state).await?;
    Ok(())
}
