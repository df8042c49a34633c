use super::{new_id, require_non_blank};
use crate::activity::{ActivityRecorder, ActivityWarning};
use crate::authorization::{Identity, PlaylistAuthorizer};
use crate::cache::{keys, CacheLayer, Cached};
use crate::catalog_store::{Activity, ActivityAction, CatalogStore, Playlist, SongSummary};
use crate::error::{CatalogError, CatalogResult};
use crate::export::{ExportDispatcher, JobAccepted};
use crate::server::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// A playlist together with its songs, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSongs {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub songs: Vec<SongSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistActivities {
    pub playlist_id: String,
    pub activities: Vec<Activity>,
}

/// Outcome of adding or removing a playlist song. The change itself is
/// committed even when `activity_warning` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongChange {
    pub playlist_id: String,
    pub song_id: String,
    pub action: ActivityAction,
    pub activity_warning: Option<ActivityWarning>,
}

#[derive(Clone)]
pub struct PlaylistService {
    store: Arc<dyn CatalogStore>,
    cache: CacheLayer,
    authorizer: PlaylistAuthorizer,
    activities: ActivityRecorder,
    exports: ExportDispatcher,
}

impl PlaylistService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        cache: CacheLayer,
        authorizer: PlaylistAuthorizer,
        activities: ActivityRecorder,
        exports: ExportDispatcher,
    ) -> Self {
        Self {
            store,
            cache,
            authorizer,
            activities,
            exports,
        }
    }

    pub async fn create_playlist(&self, name: &str, owner: &Identity) -> CatalogResult<String> {
        require_non_blank("name", name)?;
        let playlist = Playlist {
            id: new_id("playlist"),
            name: name.to_string(),
            owner: owner.as_str().to_string(),
        };
        self.store.insert_playlist(&playlist)?;
        metrics::record_catalog_item_added("playlist");
        info!("{} created playlist {}", owner, playlist.id);
        Ok(playlist.id)
    }

    /// Playlists the identity owns or collaborates on.
    pub async fn list_playlists(&self, identity: &Identity) -> CatalogResult<Vec<Playlist>> {
        Ok(self.store.list_playlists_for(identity.as_str())?)
    }

    pub async fn delete_playlist(&self, playlist_id: &str, identity: &Identity) -> CatalogResult<()> {
        self.authorizer.verify_owner(playlist_id, identity)?;
        if !self.store.delete_playlist(playlist_id)? {
            return Err(CatalogError::not_found("Playlist", playlist_id));
        }
        metrics::record_catalog_item_removed("playlist");
        self.cache.invalidate([keys::playlist_songs(playlist_id)]).await;
        info!("{} deleted playlist {}", identity, playlist_id);
        Ok(())
    }

    pub async fn add_song(
        &self,
        playlist_id: &str,
        song_id: &str,
        identity: &Identity,
    ) -> CatalogResult<PlaylistSongChange> {
        self.authorizer.verify_access(playlist_id, identity)?;
        if self.store.get_song(song_id)?.is_none() {
            return Err(CatalogError::not_found("Song", song_id));
        }
        self.store.insert_playlist_song(playlist_id, song_id)?;
        Ok(self
            .after_song_change(playlist_id, song_id, identity, ActivityAction::Add)
            .await)
    }

    /// Removes every occurrence of the song from the playlist.
    pub async fn remove_song(
        &self,
        playlist_id: &str,
        song_id: &str,
        identity: &Identity,
    ) -> CatalogResult<PlaylistSongChange> {
        self.authorizer.verify_access(playlist_id, identity)?;
        if self.store.delete_playlist_song(playlist_id, song_id)? == 0 {
            return Err(CatalogError::NotFound(format!(
                "Song {} is not in playlist {}",
                song_id, playlist_id
            )));
        }
        Ok(self
            .after_song_change(playlist_id, song_id, identity, ActivityAction::Delete)
            .await)
    }

    pub async fn list_songs(
        &self,
        playlist_id: &str,
        identity: &Identity,
    ) -> CatalogResult<Cached<PlaylistSongs>> {
        self.authorizer.verify_access(playlist_id, identity)?;
        self.cache
            .get_or_load(&keys::playlist_songs(playlist_id), || {
                let playlist = self
                    .store
                    .get_playlist(playlist_id)?
                    .ok_or_else(|| CatalogError::not_found("Playlist", playlist_id))?;
                let songs = self.store.list_playlist_songs(playlist_id)?;
                Ok(PlaylistSongs {
                    id: playlist.id,
                    name: playlist.name,
                    owner: playlist.owner,
                    songs,
                })
            })
            .await
    }

    pub async fn list_activities(
        &self,
        playlist_id: &str,
        identity: &Identity,
    ) -> CatalogResult<PlaylistActivities> {
        self.authorizer.verify_access(playlist_id, identity)?;
        Ok(PlaylistActivities {
            playlist_id: playlist_id.to_string(),
            activities: self.activities.list(playlist_id)?,
        })
    }

    pub async fn add_collaborator(
        &self,
        playlist_id: &str,
        owner: &Identity,
        collaborator: &Identity,
    ) -> CatalogResult<()> {
        self.authorizer.verify_owner(playlist_id, owner)?;
        if collaborator == owner {
            return Err(CatalogError::Invariant(
                "The owner cannot be a collaborator of their own playlist".to_string(),
            ));
        }
        if !self
            .store
            .insert_collaboration(playlist_id, collaborator.as_str())?
        {
            return Err(CatalogError::Invariant(format!(
                "{} already collaborates on playlist {}",
                collaborator, playlist_id
            )));
        }
        info!("{} added collaborator {} to {}", owner, collaborator, playlist_id);
        Ok(())
    }

    pub async fn remove_collaborator(
        &self,
        playlist_id: &str,
        owner: &Identity,
        collaborator: &Identity,
    ) -> CatalogResult<()> {
        self.authorizer.verify_owner(playlist_id, owner)?;
        if !self
            .store
            .delete_collaboration(playlist_id, collaborator.as_str())?
        {
            return Err(CatalogError::NotFound(format!(
                "{} does not collaborate on playlist {}",
                collaborator, playlist_id
            )));
        }
        info!(
            "{} removed collaborator {} from {}",
            owner, collaborator, playlist_id
        );
        Ok(())
    }

    pub async fn export(
        &self,
        playlist_id: &str,
        requester: &Identity,
        target_email: &str,
    ) -> CatalogResult<JobAccepted> {
        self.exports
            .dispatch(playlist_id, requester, target_email)
            .await
    }

    async fn after_song_change(
        &self,
        playlist_id: &str,
        song_id: &str,
        identity: &Identity,
        action: ActivityAction,
    ) -> PlaylistSongChange {
        let activity_warning = self
            .activities
            .record(playlist_id, song_id, identity, action)
            .err();
        if let Some(warning) = &activity_warning {
            warn!("{}", warning);
        }
        self.cache.invalidate([keys::playlist_songs(playlist_id)]).await;
        PlaylistSongChange {
            playlist_id: playlist_id.to_string(),
            song_id: song_id.to_string(),
            action,
            activity_warning,
        }
    }
}
