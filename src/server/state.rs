use axum::extract::FromRef;

use crate::services::{AlbumService, CatalogServices, PlaylistService, SongService};
use std::sync::Arc;
use std::time::Instant;

use super::session::TokenVerifier;
use super::ServerConfig;

pub type GuardedTokenVerifier = Arc<TokenVerifier>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub album_service: AlbumService,
    pub song_service: SongService,
    pub playlist_service: PlaylistService,
    pub token_verifier: GuardedTokenVerifier,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        services: CatalogServices,
        token_verifier: TokenVerifier,
        hash: String,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            hash,
            album_service: services.albums,
            song_service: services.songs,
            playlist_service: services.playlists,
            token_verifier: Arc::new(token_verifier),
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for AlbumService {
    fn from_ref(input: &ServerState) -> Self {
        input.album_service.clone()
    }
}

impl FromRef<ServerState> for SongService {
    fn from_ref(input: &ServerState) -> Self {
        input.song_service.clone()
    }
}

impl FromRef<ServerState> for PlaylistService {
    fn from_ref(input: &ServerState) -> Self {
        input.playlist_service.clone()
    }
}

impl FromRef<ServerState> for GuardedTokenVerifier {
    fn from_ref(input: &ServerState) -> Self {
        input.token_verifier.clone()
    }
}
