use super::handlers::{
    health_check, load_player, player_png, remove_player, set_progress, waveform_png, waveform_profile,
};
use crate::app_state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.settings().server.max_body_bytes;
    Router::new()
        .route("/", get(|| async { "Waveform Server" }))
        .route("/health", get(health_check))
        .route("/waveform/profile", post(waveform_profile))
        .route("/waveform.png", post(waveform_png))
        .route("/players/:name", post(load_player).delete(remove_player))
        .route("/players/:name/waveform.png", get(player_png))
        .route("/players/:name/progress", put(set_progress))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}
