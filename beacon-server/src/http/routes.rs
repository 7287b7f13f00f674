use crate::config::ServerConfig;
use crate::http::handlers;
use crate::http::AppState;
use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// Uploads may carry whole files; leave headroom above the store's own cap.
const BODY_LIMIT: usize = 11 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/session", post(handlers::create_session))
        .route("/api/ice-servers", get(handlers::ice_servers))
        .route(
            "/api/rooms",
            post(handlers::create_room).get(handlers::list_rooms),
        )
        .route("/api/rooms/{room}", get(handlers::room_details))
        .route("/api/rooms/{room}/join", post(handlers::join_room))
        .route("/api/rooms/{room}/leave", post(handlers::leave_room))
        .route(
            "/api/rooms/{room}/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route(
            "/api/rooms/{room}/signals",
            get(handlers::poll_signals).post(handlers::send_signal),
        )
        .route("/api/signals/{signal}/ack", post(handlers::ack_signal))
        .route("/api/files", post(handlers::upload_file))
        .route("/api/files/{file}", get(handlers::download_file))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the task is cancelled.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("relay listening on http://{}", config.bind_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
