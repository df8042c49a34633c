//! Playlist authorization.
//!
//! Decisions are always taken against the store; nothing here is cached.

use crate::catalog_store::{CatalogStore, Playlist};
use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An authenticated caller, resolved upstream from the request credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Identity(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity::new(value)
    }
}

/// How an identity relates to a playlist it was granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAccess {
    Owner,
    Collaborator,
}

#[derive(Clone)]
pub struct PlaylistAuthorizer {
    store: Arc<dyn CatalogStore>,
}

impl PlaylistAuthorizer {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        PlaylistAuthorizer { store }
    }

    /// Succeeds only for the playlist owner.
    pub fn verify_owner(&self, playlist_id: &str, identity: &Identity) -> CatalogResult<Playlist> {
        let playlist = self.load(playlist_id)?;
        if playlist.owner != identity.as_str() {
            debug!(
                "{} is not the owner of playlist {}",
                identity, playlist_id
            );
            return Err(CatalogError::Forbidden(
                "You are not allowed to access this resource".to_string(),
            ));
        }
        Ok(playlist)
    }

    /// Succeeds for the owner and for collaborators.
    pub fn verify_access(
        &self,
        playlist_id: &str,
        identity: &Identity,
    ) -> CatalogResult<PlaylistAccess> {
        let playlist = self.load(playlist_id)?;
        if playlist.owner == identity.as_str() {
            return Ok(PlaylistAccess::Owner);
        }
        if self.store.is_collaborator(playlist_id, identity.as_str())? {
            return Ok(PlaylistAccess::Collaborator);
        }
        debug!("{} has no access to playlist {}", identity, playlist_id);
        Err(CatalogError::Forbidden(
            "You are not allowed to access this resource".to_string(),
        ))
    }

    fn load(&self, playlist_id: &str) -> CatalogResult<Playlist> {
        self.store
            .get_playlist(playlist_id)?
            .ok_or_else(|| CatalogError::not_found("Playlist", playlist_id))
    }
}
