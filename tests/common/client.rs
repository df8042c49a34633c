//! HTTP client for the integration tests
//!
//! Wraps reqwest with one method per route. When API routes or request
//! formats change, update only this file.

use super::constants::*;
use super::fixtures::mint_token;
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
    token: Option<String>,
}

impl TestClient {
    /// Creates a client sending no credentials.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client sending a valid bearer token for `user_id`.
    pub fn authenticated(base_url: String, user_id: &str) -> Self {
        Self {
            token: Some(mint_token(user_id)),
            ..Self::new(base_url)
        }
    }

    /// Creates a client sending an arbitrary bearer token.
    pub fn with_token(base_url: String, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::new(base_url)
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Response {
        builder.send().await.expect("Request failed")
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/")).await
    }

    pub async fn get_metrics(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/metrics")).await
    }

    // ========================================================================
    // Albums
    // ========================================================================

    pub async fn post_album(&self, name: &str, year: i32) -> Response {
        Self::send(
            self.request(reqwest::Method::POST, "/albums")
                .json(&json!({ "name": name, "year": year })),
        )
        .await
    }

    pub async fn get_albums(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/albums")).await
    }

    pub async fn get_album(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/albums/{}", id))).await
    }

    pub async fn put_album(&self, id: &str, name: &str, year: i32) -> Response {
        Self::send(
            self.request(reqwest::Method::PUT, &format!("/albums/{}", id))
                .json(&json!({ "name": name, "year": year })),
        )
        .await
    }

    pub async fn delete_album(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::DELETE, &format!("/albums/{}", id))).await
    }

    pub async fn post_cover(&self, id: &str, cover_url: &str) -> Response {
        Self::send(
            self.request(reqwest::Method::POST, &format!("/albums/{}/covers", id))
                .json(&json!({ "coverUrl": cover_url })),
        )
        .await
    }

    pub async fn post_like(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::POST, &format!("/albums/{}/likes", id))).await
    }

    pub async fn delete_like(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::DELETE, &format!("/albums/{}/likes", id))).await
    }

    pub async fn get_likes(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/albums/{}/likes", id))).await
    }

    // ========================================================================
    // Songs
    // ========================================================================

    pub async fn post_song(&self, body: Value) -> Response {
        Self::send(self.request(reqwest::Method::POST, "/songs").json(&body)).await
    }

    pub async fn get_songs(&self, query: &[(&str, &str)]) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/songs").query(query)).await
    }

    pub async fn get_song(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/songs/{}", id))).await
    }

    pub async fn put_song(&self, id: &str, body: Value) -> Response {
        Self::send(
            self.request(reqwest::Method::PUT, &format!("/songs/{}", id))
                .json(&body),
        )
        .await
    }

    pub async fn delete_song(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::DELETE, &format!("/songs/{}", id))).await
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    pub async fn post_playlist(&self, name: &str) -> Response {
        Self::send(
            self.request(reqwest::Method::POST, "/playlists")
                .json(&json!({ "name": name })),
        )
        .await
    }

    /// Creates a playlist and returns its id.
    pub async fn create_playlist(&self, name: &str) -> String {
        let response = self.post_playlist(name).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["playlistId"]
            .as_str()
            .expect("Missing playlistId")
            .to_string()
    }

    pub async fn get_playlists(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/playlists")).await
    }

    pub async fn delete_playlist(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::DELETE, &format!("/playlists/{}", id))).await
    }

    pub async fn post_playlist_song(&self, playlist_id: &str, song_id: &str) -> Response {
        Self::send(
            self.request(
                reqwest::Method::POST,
                &format!("/playlists/{}/songs", playlist_id),
            )
            .json(&json!({ "songId": song_id })),
        )
        .await
    }

    pub async fn get_playlist_songs(&self, playlist_id: &str) -> Response {
        Self::send(self.request(
            reqwest::Method::GET,
            &format!("/playlists/{}/songs", playlist_id),
        ))
        .await
    }

    pub async fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Response {
        Self::send(
            self.request(
                reqwest::Method::DELETE,
                &format!("/playlists/{}/songs", playlist_id),
            )
            .json(&json!({ "songId": song_id })),
        )
        .await
    }

    pub async fn get_activities(&self, playlist_id: &str) -> Response {
        Self::send(self.request(
            reqwest::Method::GET,
            &format!("/playlists/{}/activities", playlist_id),
        ))
        .await
    }

    // ========================================================================
    // Collaborations and export
    // ========================================================================

    pub async fn post_collaboration(&self, playlist_id: &str, user_id: &str) -> Response {
        Self::send(
            self.request(reqwest::Method::POST, "/collaborations")
                .json(&json!({ "playlistId": playlist_id, "userId": user_id })),
        )
        .await
    }

    pub async fn delete_collaboration(&self, playlist_id: &str, user_id: &str) -> Response {
        Self::send(
            self.request(reqwest::Method::DELETE, "/collaborations")
                .json(&json!({ "playlistId": playlist_id, "userId": user_id })),
        )
        .await
    }

    pub async fn post_export(&self, playlist_id: &str, target_email: &str) -> Response {
        Self::send(
            self.request(
                reqwest::Method::POST,
                &format!("/export/playlists/{}", playlist_id),
            )
            .json(&json!({ "targetEmail": target_email })),
        )
        .await
    }
}
