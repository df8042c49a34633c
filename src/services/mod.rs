//! Catalog operations: authorization, store writes, activity recording and
//! cache invalidation wired together.

mod albums;
mod playlists;
mod songs;

pub use albums::{AlbumService, LikeOutcome};
pub use playlists::{PlaylistActivities, PlaylistService, PlaylistSongChange, PlaylistSongs};
pub use songs::SongService;

use crate::activity::ActivityRecorder;
use crate::authorization::PlaylistAuthorizer;
use crate::cache::CacheLayer;
use crate::catalog_store::CatalogStore;
use crate::error::{CatalogError, CatalogResult};
use crate::export::{ExportDispatcher, MessageQueue};
use rand::{rng, Rng};
use rand_distr::Alphanumeric;
use std::sync::Arc;

/// The three services sharing one store, one cache and one export queue.
#[derive(Clone)]
pub struct CatalogServices {
    pub albums: AlbumService,
    pub songs: SongService,
    pub playlists: PlaylistService,
}

impl CatalogServices {
    pub fn new<S: CatalogStore + 'static>(
        store: Arc<S>,
        cache: CacheLayer,
        queue: Arc<dyn MessageQueue>,
    ) -> Self {
        let authorizer = PlaylistAuthorizer::new(store.clone());
        let playlists = PlaylistService::new(
            store.clone(),
            cache.clone(),
            authorizer.clone(),
            ActivityRecorder::new(store.clone()),
            ExportDispatcher::new(authorizer, queue),
        );
        CatalogServices {
            albums: AlbumService::new(store.clone(), cache.clone()),
            songs: SongService::new(store, cache),
            playlists,
        }
    }
}

const ID_RANDOM_PART_LEN: usize = 16;

/// A random A-z0-9 string
fn random_string(len: usize) -> String {
    let bytes = rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .collect::<Vec<u8>>();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Generates an id such as `album-Xy3...`.
fn new_id(entity: &str) -> String {
    format!("{}-{}", entity, random_string(ID_RANDOM_PART_LEN))
}

fn require_non_blank(field: &str, value: &str) -> CatalogResult<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::Invariant(format!(
            "\"{}\" must not be empty",
            field
        )));
    }
    Ok(())
}

fn require_valid_year(year: i32) -> CatalogResult<()> {
    if !(1..=9999).contains(&year) {
        return Err(CatalogError::Invariant(format!(
            "\"year\" must be between 1 and 9999, got {}",
            year
        )));
    }
    Ok(())
}
