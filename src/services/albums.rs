use super::{new_id, require_non_blank, require_valid_year};
use crate::authorization::Identity;
use crate::cache::{keys, CacheLayer, Cached, DataSource};
use crate::catalog_store::{Album, AlbumDetail, AlbumInput, AlbumSummary, CatalogStore};
use crate::error::{CatalogError, CatalogResult};
use crate::server::metrics;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Result of a like, unlike or toggle. None of them is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeOutcome {
    Liked,
    AlreadyLiked,
    Unliked,
    NotLiked,
}

#[derive(Clone)]
pub struct AlbumService {
    store: Arc<dyn CatalogStore>,
    cache: CacheLayer,
}

impl AlbumService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    pub async fn add_album(&self, input: &AlbumInput) -> CatalogResult<String> {
        validate_album(input)?;
        let album = Album {
            id: new_id("album"),
            name: input.name.clone(),
            year: input.year,
            cover_url: None,
        };
        self.store.insert_album(&album)?;
        metrics::record_catalog_item_added("album");
        self.cache.invalidate([keys::ALL_ALBUMS]).await;
        info!("Added album {} ({})", album.id, album.name);
        Ok(album.id)
    }

    pub async fn list_albums(&self) -> CatalogResult<Cached<Vec<AlbumSummary>>> {
        self.cache
            .get_or_load(keys::ALL_ALBUMS, || Ok(self.store.list_albums()?))
            .await
    }

    /// Album with its songs. Cache-sourced if either part came from the cache.
    pub async fn get_album(&self, id: &str) -> CatalogResult<Cached<AlbumDetail>> {
        let album = self
            .cache
            .get_or_load(&keys::album(id), || self.load_album(id))
            .await?;
        let songs = self
            .cache
            .get_or_load(&keys::songs_by_album(id), || {
                Ok(self.store.list_songs_by_album(id)?)
            })
            .await?;

        let source = if album.is_from_cache() || songs.is_from_cache() {
            DataSource::Cache
        } else {
            DataSource::Store
        };
        Ok(Cached {
            value: AlbumDetail {
                album: album.value,
                songs: songs.value,
            },
            source,
        })
    }

    pub async fn edit_album(&self, id: &str, input: &AlbumInput) -> CatalogResult<()> {
        validate_album(input)?;
        if !self.store.update_album(id, input)? {
            return Err(CatalogError::not_found("Album", id));
        }
        self.cache
            .invalidate([keys::album(id), keys::ALL_ALBUMS.to_string()])
            .await;
        Ok(())
    }

    pub async fn set_cover(&self, id: &str, cover_url: &str) -> CatalogResult<()> {
        require_non_blank("coverUrl", cover_url)?;
        if !self.store.set_album_cover(id, cover_url)? {
            return Err(CatalogError::not_found("Album", id));
        }
        self.cache
            .invalidate([keys::album(id), keys::ALL_ALBUMS.to_string()])
            .await;
        Ok(())
    }

    /// Deletes the album. Its songs are kept but no longer belong to an album.
    pub async fn delete_album(&self, id: &str) -> CatalogResult<()> {
        if !self.store.delete_album(id)? {
            return Err(CatalogError::not_found("Album", id));
        }
        metrics::record_catalog_item_removed("album");
        self.cache
            .invalidate([
                keys::album(id),
                keys::ALL_ALBUMS.to_string(),
                keys::songs_by_album(id),
                keys::album_likes(id),
            ])
            .await;
        info!("Deleted album {}", id);
        Ok(())
    }

    pub async fn like(&self, album_id: &str, user: &Identity) -> CatalogResult<LikeOutcome> {
        self.ensure_album_exists(album_id)?;
        let inserted = self.store.insert_like(album_id, user.as_str())?;
        self.cache.invalidate([keys::album_likes(album_id)]).await;
        Ok(if inserted {
            LikeOutcome::Liked
        } else {
            LikeOutcome::AlreadyLiked
        })
    }

    pub async fn unlike(&self, album_id: &str, user: &Identity) -> CatalogResult<LikeOutcome> {
        self.ensure_album_exists(album_id)?;
        let deleted = self.store.delete_like(album_id, user.as_str())?;
        self.cache.invalidate([keys::album_likes(album_id)]).await;
        Ok(if deleted {
            LikeOutcome::Unliked
        } else {
            LikeOutcome::NotLiked
        })
    }

    /// Likes the album if the user has not liked it yet, unlikes it otherwise.
    pub async fn toggle_like(
        &self,
        album_id: &str,
        user: &Identity,
    ) -> CatalogResult<LikeOutcome> {
        self.ensure_album_exists(album_id)?;
        if self.store.has_like(album_id, user.as_str())? {
            self.unlike(album_id, user).await
        } else {
            self.like(album_id, user).await
        }
    }

    pub async fn likes(&self, album_id: &str) -> CatalogResult<Cached<u64>> {
        self.cache
            .get_or_load(&keys::album_likes(album_id), || {
                self.ensure_album_exists(album_id)?;
                Ok(self.store.count_likes(album_id)?)
            })
            .await
    }

    fn load_album(&self, id: &str) -> CatalogResult<Album> {
        self.store
            .get_album(id)?
            .ok_or_else(|| CatalogError::not_found("Album", id))
    }

    fn ensure_album_exists(&self, id: &str) -> CatalogResult<()> {
        self.load_album(id).map(|_| ())
    }
}

fn validate_album(input: &AlbumInput) -> CatalogResult<()> {
    require_non_blank("name", &input.name)?;
    require_valid_year(input.year)
}
