use crate::app_state::{AppState, Player};
use crate::audio::codec::CODEC_FACTORY;
use crate::audio::compute_amplitude_profile;
use crate::error::{AudioError, Error, ServerError};
use crate::player::{LoadOutcome, PlayerPhase};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, Instrument};

const DEGRADED_HEADER: &str = "x-waveform-degraded";
const MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Default, Deserialize)]
pub struct RenderParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Playback fraction for the progress overlay.
    pub progress: Option<f64>,
    /// Container extension hint such as `mp3`.
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressParams {
    pub fraction: f64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub degraded: bool,
    pub bucket_count: usize,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_seconds: f64,
    pub buckets: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub name: String,
    pub phase: PlayerPhase,
    pub degraded: bool,
    pub progress: f64,
}

impl RenderParams {
    fn size(&self, state: &AppState) -> Result<(u32, u32), ServerError> {
        let width = self.width.unwrap_or(state.settings().player.surface_width);
        let height = self.height.unwrap_or(state.settings().player.surface_height);
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ServerError::BadRequest(format!(
                "surface size {width}x{height} outside 1..={MAX_DIMENSION}"
            )));
        }
        Ok((width, height))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Init(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = state.start_time.elapsed().unwrap_or_default();
    let response = serde_json::json!({
        "status": "ok",
        "uptime": format!("{}s", uptime.as_secs()),
        "players": state.player_names().len(),
        "message": "Waveform service is running"
    });
    tracing::debug!("Health check response: {:?}", response);
    Json(response)
}

pub async fn waveform_profile(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RenderParams>,
    body: Bytes,
) -> Response {
    let bucket_count = state.settings().waveform.bucket_count;
    let format = params.format.clone();
    let decoded = tokio::task::spawn_blocking(move || {
        let audio = CODEC_FACTORY.decode(&body, format.as_deref())?;
        let profile = compute_amplitude_profile(audio.first_channel(), bucket_count);
        Ok::<_, Error>((audio, profile))
    })
    .await
    .unwrap_or_else(|e| Err(AudioError::DecodeTask(e.to_string()).into()));

    match decoded {
        Ok((audio, profile)) => {
            info!("Computed {}-bucket profile", profile.len());
            Json(ProfileResponse {
                degraded: false,
                bucket_count: profile.len(),
                sample_rate: audio.sample_rate,
                channels: audio.channel_count(),
                duration_seconds: audio.duration().as_secs_f64(),
                buckets: profile.values().to_vec(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::warn!("Profile request could not be decoded: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "degraded": true, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn waveform_png(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RenderParams>,
    body: Bytes,
) -> Response {
    let (width, height) = match params.size(&state) {
        Ok(size) => size,
        Err(e) => return e.into_response(),
    };

    let player = state.new_player(width, height, params.format.clone());
    let outcome = player.load(body.to_vec()).await;
    if let Some(progress) = params.progress {
        player.set_playback_fraction(progress);
    }
    let response = png_response(&player, matches!(outcome, LoadOutcome::Fallback { .. }));
    player.teardown();
    response
}

pub async fn load_player(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<RenderParams>,
    body: Bytes,
) -> Response {
    let (width, height) = match params.size(&state) {
        Ok(size) => size,
        Err(e) => return e.into_response(),
    };

    let span = tracing::info_span!("load_player", player = %name);
    async {
        let player = state.insert_player(name.clone(), state.new_player(width, height, params.format.clone()));
        player.start_progress_timer(state.settings().player.progress_interval());
        let outcome = player.load(body.to_vec()).await;
        info!(?outcome, "Player loaded");
        Json(player_response(&name, &player)).into_response()
    }
    .instrument(span)
    .await
}

pub async fn player_png(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.player(&name) {
        Some(player) => png_response(&player, player.is_degraded()),
        None => not_found(&name),
    }
}

pub async fn set_progress(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<ProgressParams>,
) -> Response {
    match state.player(&name) {
        Some(player) => {
            player.seek_to_fraction(params.fraction);
            Json(player_response(&name, &player)).into_response()
        }
        None => not_found(&name),
    }
}

pub async fn remove_player(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    if state.remove_player(&name) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&name)
    }
}

fn player_response(name: &str, player: &Player) -> PlayerResponse {
    PlayerResponse {
        name: name.to_string(),
        phase: player.phase(),
        degraded: player.is_degraded(),
        progress: player.overlay().fraction(),
    }
}

fn png_response(player: &Player, degraded: bool) -> Response {
    match player.with_surface(|surface| surface.to_png()) {
        Ok(png) => {
            info!("Generated {} byte waveform image (degraded: {})", png.len(), degraded);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "image/png".to_string()),
                    (header::CONTENT_DISPOSITION, "inline".to_string()),
                    (HeaderName::from_static(DEGRADED_HEADER), degraded.to_string()),
                ],
                png,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode waveform image: {}", e);
            ServerError::Internal(e.to_string()).into_response()
        }
    }
}

fn not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("no player named {name:?}") })),
    )
        .into_response()
}
