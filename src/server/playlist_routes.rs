//! Playlist, collaboration and export HTTP routes.
//!
//! Every route here needs a bearer token. Playlist ownership and
//! collaboration checks happen in the services.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::authorization::Identity;
use crate::error::CatalogError;
use crate::server::session::Session;
use crate::server::state::ServerState;
use crate::services::PlaylistService;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongBody {
    pub song_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationBody {
    pub playlist_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBody {
    pub target_email: String,
}

// =============================================================================
// Playlists
// =============================================================================

/// POST /playlists
async fn post_playlist(
    session: Session,
    State(playlists): State<PlaylistService>,
    Json(body): Json<CreatePlaylistBody>,
) -> Result<Response, CatalogError> {
    let playlist_id = playlists
        .create_playlist(&body.name, &session.identity)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "playlistId": playlist_id })),
    )
        .into_response())
}

/// GET /playlists - owned and collaborating
async fn get_playlists(
    session: Session,
    State(playlists): State<PlaylistService>,
) -> Result<Response, CatalogError> {
    let found = playlists.list_playlists(&session.identity).await?;
    Ok(Json(json!({ "playlists": found })).into_response())
}

/// DELETE /playlists/{id}
async fn delete_playlist(
    session: Session,
    State(playlists): State<PlaylistService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    playlists.delete_playlist(&id, &session.identity).await?;
    Ok(StatusCode::OK.into_response())
}

/// POST /playlists/{id}/songs
async fn post_playlist_song(
    session: Session,
    State(playlists): State<PlaylistService>,
    Path(id): Path<String>,
    Json(body): Json<PlaylistSongBody>,
) -> Result<Response, CatalogError> {
    let change = playlists
        .add_song(&id, &body.song_id, &session.identity)
        .await?;
    Ok((StatusCode::CREATED, Json(change)).into_response())
}

/// GET /playlists/{id}/songs
async fn get_playlist_songs(
    session: Session,
    State(playlists): State<PlaylistService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let playlist = playlists.list_songs(&id, &session.identity).await?;
    Ok(playlist
        .map(|playlist| json!({ "playlist": playlist }))
        .into_response())
}

/// DELETE /playlists/{id}/songs
async fn delete_playlist_song(
    session: Session,
    State(playlists): State<PlaylistService>,
    Path(id): Path<String>,
    Json(body): Json<PlaylistSongBody>,
) -> Result<Response, CatalogError> {
    let change = playlists
        .remove_song(&id, &body.song_id, &session.identity)
        .await?;
    Ok(Json(change).into_response())
}

/// GET /playlists/{id}/activities
async fn get_activities(
    session: Session,
    State(playlists): State<PlaylistService>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let activities = playlists.list_activities(&id, &session.identity).await?;
    Ok(Json(activities).into_response())
}

// =============================================================================
// Collaborations
// =============================================================================

/// POST /collaborations
async fn post_collaboration(
    session: Session,
    State(playlists): State<PlaylistService>,
    Json(body): Json<CollaborationBody>,
) -> Result<Response, CatalogError> {
    playlists
        .add_collaborator(
            &body.playlist_id,
            &session.identity,
            &Identity::new(body.user_id),
        )
        .await?;
    Ok(StatusCode::CREATED.into_response())
}

/// DELETE /collaborations
async fn delete_collaboration(
    session: Session,
    State(playlists): State<PlaylistService>,
    Json(body): Json<CollaborationBody>,
) -> Result<Response, CatalogError> {
    playlists
        .remove_collaborator(
            &body.playlist_id,
            &session.identity,
            &Identity::new(body.user_id),
        )
        .await?;
    Ok(StatusCode::OK.into_response())
}

// =============================================================================
// Export
// =============================================================================

/// POST /export/playlists/{id}
async fn post_export(
    session: Session,
    State(playlists): State<PlaylistService>,
    Path(id): Path<String>,
    Json(body): Json<ExportBody>,
) -> Result<Response, CatalogError> {
    let accepted = playlists
        .export(&id, &session.identity, &body.target_email)
        .await?;
    Ok((StatusCode::CREATED, Json(accepted)).into_response())
}

// =============================================================================
// Router Construction
// =============================================================================

pub fn playlist_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(post_playlist).get(get_playlists))
        .route("/{id}", delete(delete_playlist))
        .route(
            "/{id}/songs",
            post(post_playlist_song)
                .get(get_playlist_songs)
                .delete(delete_playlist_song),
        )
        .route("/{id}/activities", get(get_activities))
}

pub fn collaboration_routes() -> Router<ServerState> {
    Router::new().route("/", post(post_collaboration).delete(delete_collaboration))
}

pub fn export_routes() -> Router<ServerState> {
    Router::new().route("/playlists/{id}", post(post_export))
}
