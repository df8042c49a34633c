//! Album HTTP routes: CRUD, cover and likes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::catalog_store::AlbumInput;
use crate::error::CatalogError;
use crate::server::session::Session;
use crate::server::state::ServerState;
use crate::services::AlbumService;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverBody {
    pub cover_url: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /albums
async fn post_album(
    State(albums): State<AlbumService>,
    Json(body): Json<AlbumInput>,
) -> Result<Response, CatalogError> {
    let album_id = albums.add_album(&body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "albumId": album_id }))).into_response())
}

/// GET /albums
async fn get_albums(State(albums): State<AlbumService>) -> Result<Response, CatalogError> {
    let listing = albums.list_albums().await?;
    Ok(listing.map(|albums| json!({ "albums": albums })).into_response())
}

/// GET /albums/{id}
async fn get_album(
    State(albums): State<AlbumService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let detail = albums.get_album(&id).await?;
    Ok(detail.map(|album| json!({ "album": album })).into_response())
}

/// PUT /albums/{id}
async fn put_album(
    State(albums): State<AlbumService>,
    Path(id): Path<String>,
    Json(body): Json<AlbumInput>,
) -> Result<Response, CatalogError> {
    albums.edit_album(&id, &body).await?;
    Ok(StatusCode::OK.into_response())
}

/// DELETE /albums/{id}
async fn delete_album(
    State(albums): State<AlbumService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    albums.delete_album(&id).await?;
    Ok(StatusCode::OK.into_response())
}

/// POST /albums/{id}/covers
async fn post_cover(
    State(albums): State<AlbumService>,
    Path(id): Path<String>,
    Json(body): Json<CoverBody>,
) -> Result<Response, CatalogError> {
    albums.set_cover(&id, &body.cover_url).await?;
    Ok(StatusCode::CREATED.into_response())
}

/// POST /albums/{id}/likes - toggles the caller's like
async fn post_like(
    session: Session,
    State(albums): State<AlbumService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let outcome = albums.toggle_like(&id, &session.identity).await?;
    Ok((StatusCode::CREATED, Json(json!({ "outcome": outcome }))).into_response())
}

/// DELETE /albums/{id}/likes
async fn delete_like(
    session: Session,
    State(albums): State<AlbumService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let outcome = albums.unlike(&id, &session.identity).await?;
    Ok(Json(json!({ "outcome": outcome })).into_response())
}

/// GET /albums/{id}/likes
async fn get_likes(
    State(albums): State<AlbumService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let likes = albums.likes(&id).await?;
    Ok(likes.map(|likes| json!({ "likes": likes })).into_response())
}

// =============================================================================
// Router Construction
// =============================================================================

pub fn album_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(post_album).get(get_albums))
        .route("/{id}", get(get_album).put(put_album).delete(delete_album))
        .route("/{id}/covers", post(post_cover))
        .route(
            "/{id}/likes",
            post(post_like).get(get_likes).delete(delete_like),
        )
}
