pub mod config;
pub mod dictionary;
pub mod error;
pub mod game;
pub mod models;
pub mod rooms;
pub mod routes;
pub mod utils;
pub mod websocket;

use std::sync::Arc;

use axum::{routing::get, Router};
use config::Config;
use rooms::RoomRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub registry: RoomRegistry,
}

/// Routes, static fallback and middleware around `state`
pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve frontend static files
    let frontend_service = ServeDir::new(&state.config.server.frontend_dir);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        .merge(routes::create_routes())
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
