//! Test data and service-level harness

use super::constants::*;
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use openmusic_catalog_server::activity::ActivityRecorder;
use openmusic_catalog_server::authorization::PlaylistAuthorizer;
use openmusic_catalog_server::cache::{CacheError, CacheLayer, CacheStore, InMemoryCacheStore};
use openmusic_catalog_server::catalog_store::{
    Activity, ActivityStore, Album, AlbumInput, AlbumStore, NewActivity, Song, SongInput,
    SongStore, SqliteCatalogStore,
};
use openmusic_catalog_server::export::{
    ChannelMessageQueue, ExportDispatcher, MessageQueue, QueueError, QueuedMessage,
};
use openmusic_catalog_server::server::Claims;
use openmusic_catalog_server::services::{
    AlbumService, CatalogServices, PlaylistService, SongService,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub fn bloom_input() -> AlbumInput {
    AlbumInput {
        name: "Bloom".to_string(),
        year: 2021,
    }
}

pub fn song_input(title: &str, album_id: Option<&str>) -> SongInput {
    SongInput {
        title: title.to_string(),
        year: 2021,
        genre: "Indie".to_string(),
        performer: "Ivy Lane".to_string(),
        duration: Some(215),
        album_id: album_id.map(str::to_string),
    }
}

/// Inserts album "Bloom" with "Wildflower" on it, plus a loose single.
pub fn seed_catalog(store: &SqliteCatalogStore) -> anyhow::Result<()> {
    store.insert_album(&Album {
        id: ALBUM_BLOOM_ID.to_string(),
        name: "Bloom".to_string(),
        year: 2021,
        cover_url: None,
    })?;
    store.insert_song(&Song {
        id: SONG_WILDFLOWER_ID.to_string(),
        title: "Wildflower".to_string(),
        year: 2021,
        genre: "Indie".to_string(),
        performer: "Ivy Lane".to_string(),
        duration: Some(215),
        album_id: Some(ALBUM_BLOOM_ID.to_string()),
    })?;
    store.insert_song(&Song {
        id: SONG_NIGHT_DRIVE_ID.to_string(),
        title: "Night Drive".to_string(),
        year: 2019,
        genre: "Synthwave".to_string(),
        performer: "Neon Coast".to_string(),
        duration: None,
        album_id: None,
    })?;
    Ok(())
}

/// An HS256 token for `user_id`, valid for an hour.
pub fn mint_token(user_id: &str) -> String {
    let claims = Claims {
        id: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to mint token")
}

// ============================================================================
// Failing backends
// ============================================================================

/// Cache backend whose every call fails.
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// Activity store that refuses writes.
pub struct FailingActivityStore;

impl ActivityStore for FailingActivityStore {
    fn append_activity(&self, _activity: &NewActivity) -> anyhow::Result<i64> {
        anyhow::bail!("activity table is read-only")
    }

    fn list_activities(&self, _playlist_id: &str) -> anyhow::Result<Vec<Activity>> {
        Ok(vec![])
    }
}

/// Queue whose broker is down.
pub struct FailingMessageQueue;

#[async_trait]
impl MessageQueue for FailingMessageQueue {
    async fn publish(&self, queue: &str, _message: &str) -> Result<(), QueueError> {
        Err(QueueError::Closed(format!("broker for {} is down", queue)))
    }
}

// ============================================================================
// Service harness
// ============================================================================

/// The services over an in-memory store, without HTTP in between.
pub struct ServiceHarness {
    pub store: Arc<SqliteCatalogStore>,
    pub cache_store: Arc<InMemoryCacheStore>,
    pub albums: AlbumService,
    pub songs: SongService,
    pub playlists: PlaylistService,
    pub exports: mpsc::Receiver<QueuedMessage>,
}

impl ServiceHarness {
    pub fn new() -> Self {
        let store = Arc::new(SqliteCatalogStore::in_memory().expect("Failed to open store"));
        seed_catalog(&store).expect("Failed to seed catalog");
        let cache_store = Arc::new(InMemoryCacheStore::new());
        let cache = CacheLayer::new(cache_store.clone(), Duration::from_secs(1800));
        let (queue, exports) = ChannelMessageQueue::new(16);

        let services = CatalogServices::new(store.clone(), cache, Arc::new(queue));
        ServiceHarness {
            store,
            cache_store,
            albums: services.albums,
            songs: services.songs,
            playlists: services.playlists,
            exports,
        }
    }

    /// Playlist service over the same store, with its collaborators swapped.
    pub fn playlists_with(
        &self,
        cache_store: Arc<dyn CacheStore>,
        activity_store: Arc<dyn ActivityStore>,
        queue: Arc<dyn MessageQueue>,
    ) -> PlaylistService {
        let authorizer = PlaylistAuthorizer::new(self.store.clone());
        PlaylistService::new(
            self.store.clone(),
            CacheLayer::new(cache_store, Duration::from_secs(1800)),
            authorizer.clone(),
            ActivityRecorder::new(activity_store),
            ExportDispatcher::new(authorizer, queue),
        )
    }

    /// Drains every export message published so far.
    pub fn published_exports(&mut self) -> Vec<QueuedMessage> {
        let mut messages = vec![];
        while let Ok(message) = self.exports.try_recv() {
            messages.push(message);
        }
        messages
    }
}
