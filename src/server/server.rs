use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info};

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::album_routes::album_routes;
use super::metrics::metrics_handler;
use super::playlist_routes::{collaboration_routes, export_routes, playlist_routes};
use super::song_routes::song_routes;
use super::{log_requests, state::ServerState};
use crate::cache::{Cached, DataSource};
use crate::error::CatalogError;

/// Set on responses whose payload was served from the cache.
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
            CatalogError::Invariant(_) => StatusCode::BAD_REQUEST,
            CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &self {
            CatalogError::Store(err) => {
                error!("Store error: {:?}", err);
                "Internal server error".to_string()
            }
            CatalogError::Unavailable(msg) => {
                error!("Service unavailable: {}", msg);
                msg.clone()
            }
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));
        (status, body).into_response()
    }
}

impl<T: Serialize> IntoResponse for Cached<T> {
    fn into_response(self) -> Response {
        let mut response = Json(self.value).into_response();
        if self.source == DataSource::Cache {
            response
                .headers_mut()
                .insert(DATA_SOURCE_HEADER, HeaderValue::from_static("cache"));
        }
        response
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

pub fn make_app(state: ServerState) -> Router {
    let home_router: Router = Router::new()
        .route("/", get(home))
        .route("/metrics", get(metrics_handler))
        .with_state(state.clone());

    let api_routes: Router = Router::new()
        .nest("/albums", album_routes())
        .nest("/songs", song_routes())
        .nest("/playlists", playlist_routes())
        .nest("/collaborations", collaboration_routes())
        .nest("/export", export_routes())
        .with_state(state.clone());

    home_router
        .merge(api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server");
}
