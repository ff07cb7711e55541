pub mod handlers;
mod routes;

use crate::app_state::AppState;
use crate::error::{Result, ServerError};
use std::net::SocketAddr;
use std::sync::Arc;

pub use routes::create_router;

pub async fn run_server(app_state: Arc<AppState>) -> Result<()> {
    let app: axum::Router = routes::create_router(app_state.clone());

    let server = &app_state.settings().server;
    let addr = SocketAddr::new(
        server
            .host
            .parse()
            .map_err(|e| ServerError::Init(format!("Invalid host: {}", e)))?,
        server.port,
    );
    tracing::info!("Listening on {}", addr);
    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| ServerError::Init(format!("Server error: {}", e)))?;

    Ok(())
}
