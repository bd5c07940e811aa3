use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use gn_core::Result;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/comfort", post(handlers::gentle_comfort))
        .route("/api/comfort/bible", post(handlers::bible_comfort))
        .route("/api/comfort/philosophy", post(handlers::philosophy_comfort))
        .route("/api/tts", post(handlers::tts))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use gn_core::{Error, Result};
}
