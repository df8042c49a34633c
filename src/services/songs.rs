use super::{new_id, require_non_blank, require_valid_year};
use crate::cache::{keys, CacheLayer};
use crate::catalog_store::{CatalogStore, Song, SongFilter, SongInput, SongSummary};
use crate::error::{CatalogError, CatalogResult};
use crate::server::metrics;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct SongService {
    store: Arc<dyn CatalogStore>,
    cache: CacheLayer,
}

impl SongService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    pub async fn add_song(&self, input: &SongInput) -> CatalogResult<String> {
        self.validate(input)?;
        let song = Song {
            id: new_id("song"),
            title: input.title.clone(),
            year: input.year,
            genre: input.genre.clone(),
            performer: input.performer.clone(),
            duration: input.duration,
            album_id: input.album_id.clone(),
        };
        self.store.insert_song(&song)?;
        metrics::record_catalog_item_added("song");
        self.invalidate_album_views(song.album_id.as_deref(), None).await;
        info!("Added song {} ({})", song.id, song.title);
        Ok(song.id)
    }

    pub async fn list_songs(&self, filter: &SongFilter) -> CatalogResult<Vec<SongSummary>> {
        Ok(self.store.list_songs(filter)?)
    }

    pub async fn get_song(&self, id: &str) -> CatalogResult<Song> {
        self.store
            .get_song(id)?
            .ok_or_else(|| CatalogError::not_found("Song", id))
    }

    pub async fn edit_song(&self, id: &str, input: &SongInput) -> CatalogResult<()> {
        self.validate(input)?;
        let previous = self.get_song(id).await?;
        if !self.store.update_song(id, input)? {
            return Err(CatalogError::not_found("Song", id));
        }
        self.invalidate_album_views(input.album_id.as_deref(), previous.album_id.as_deref())
            .await;
        self.cache
            .invalidate_prefix(keys::PLAYLIST_SONGS_PREFIX)
            .await;
        Ok(())
    }

    /// Deletes the song. It also disappears from every playlist containing it.
    pub async fn delete_song(&self, id: &str) -> CatalogResult<()> {
        let previous = self.get_song(id).await?;
        if !self.store.delete_song(id)? {
            return Err(CatalogError::not_found("Song", id));
        }
        metrics::record_catalog_item_removed("song");
        self.invalidate_album_views(previous.album_id.as_deref(), None)
            .await;
        self.cache
            .invalidate_prefix(keys::PLAYLIST_SONGS_PREFIX)
            .await;
        info!("Deleted song {}", id);
        Ok(())
    }

    fn validate(&self, input: &SongInput) -> CatalogResult<()> {
        require_non_blank("title", &input.title)?;
        require_non_blank("genre", &input.genre)?;
        require_non_blank("performer", &input.performer)?;
        require_valid_year(input.year)?;
        if let Some(album_id) = &input.album_id {
            if self.store.get_album(album_id)?.is_none() {
                return Err(CatalogError::not_found("Album", album_id));
            }
        }
        Ok(())
    }

    /// Album listings embed song counts, so they go stale with any song change.
    async fn invalidate_album_views(&self, album_id: Option<&str>, other_album_id: Option<&str>) {
        let mut to_invalidate = vec![keys::ALL_ALBUMS.to_string()];
        for album_id in [album_id, other_album_id].into_iter().flatten() {
            let key = keys::songs_by_album(album_id);
            if !to_invalidate.contains(&key) {
                to_invalidate.push(key);
            }
        }
        self.cache.invalidate(to_invalidate).await;
    }
}
