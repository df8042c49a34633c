//! Song HTTP routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::catalog_store::{SongFilter, SongInput};
use crate::error::CatalogError;
use crate::server::state::ServerState;
use crate::services::SongService;

/// POST /songs
async fn post_song(
    State(songs): State<SongService>,
    Json(body): Json<SongInput>,
) -> Result<Response, CatalogError> {
    let song_id = songs.add_song(&body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "songId": song_id }))).into_response())
}

/// GET /songs?title=..&performer=..
async fn get_songs(
    State(songs): State<SongService>,
    Query(filter): Query<SongFilter>,
) -> Result<Response, CatalogError> {
    let found = songs.list_songs(&filter).await?;
    Ok(Json(json!({ "songs": found })).into_response())
}

/// GET /songs/{id}
async fn get_song(
    State(songs): State<SongService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let song = songs.get_song(&id).await?;
    Ok(Json(json!({ "song": song })).into_response())
}

/// PUT /songs/{id}
async fn put_song(
    State(songs): State<SongService>,
    Path(id): Path<String>,
    Json(body): Json<SongInput>,
) -> Result<Response, CatalogError> {
    songs.edit_song(&id, &body).await?;
    Ok(StatusCode::OK.into_response())
}

/// DELETE /songs/{id}
async fn delete_song(
    State(songs): State<SongService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    songs.delete_song(&id).await?;
    Ok(StatusCode::OK.into_response())
}

pub fn song_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(post_song).get(get_songs))
        .route("/{id}", get(get_song).put(put_song).delete(delete_song))
}
