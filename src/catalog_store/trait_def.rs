//! Storage traits for the catalog.
//!
//! Each entity family gets its own trait so services and tests can depend on
//! just the slice they need. `CatalogStore` bundles them for the server state.

use super::models::{
    Activity, Album, AlbumInput, AlbumSummary, NewActivity, Playlist, Song, SongFilter,
    SongInput, SongSummary,
};
use anyhow::Result;

pub trait AlbumStore: Send + Sync {
    fn insert_album(&self, album: &Album) -> Result<()>;

    /// Returns Ok(None) if the album does not exist.
    fn get_album(&self, id: &str) -> Result<Option<Album>>;

    /// Returns every album with the number of songs currently attached to it.
    fn list_albums(&self) -> Result<Vec<AlbumSummary>>;

    /// Returns false if the album does not exist.
    fn update_album(&self, id: &str, input: &AlbumInput) -> Result<bool>;

    /// Returns false if the album does not exist.
    fn set_album_cover(&self, id: &str, cover_url: &str) -> Result<bool>;

    /// Deletes the album, its likes, and detaches its songs.
    /// Returns false if the album does not exist.
    fn delete_album(&self, id: &str) -> Result<bool>;

    fn count_albums(&self) -> Result<usize>;
}

pub trait SongStore: Send + Sync {
    fn insert_song(&self, song: &Song) -> Result<()>;

    /// Returns Ok(None) if the song does not exist.
    fn get_song(&self, id: &str) -> Result<Option<Song>>;

    fn list_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>>;

    fn list_songs_by_album(&self, album_id: &str) -> Result<Vec<SongSummary>>;

    /// Returns false if the song does not exist.
    fn update_song(&self, id: &str, input: &SongInput) -> Result<bool>;

    /// Returns false if the song does not exist.
    fn delete_song(&self, id: &str) -> Result<bool>;

    fn count_songs(&self) -> Result<usize>;
}

pub trait PlaylistStore: Send + Sync {
    fn insert_playlist(&self, playlist: &Playlist) -> Result<()>;

    /// Returns Ok(None) if the playlist does not exist.
    fn get_playlist(&self, id: &str) -> Result<Option<Playlist>>;

    /// Playlists owned by `identity` plus the ones it collaborates on.
    fn list_playlists_for(&self, identity: &str) -> Result<Vec<Playlist>>;

    /// Returns false if the playlist does not exist.
    fn delete_playlist(&self, id: &str) -> Result<bool>;

    fn is_collaborator(&self, playlist_id: &str, identity: &str) -> Result<bool>;

    /// Returns false if the collaboration already existed.
    fn insert_collaboration(&self, playlist_id: &str, identity: &str) -> Result<bool>;

    /// Returns false if there was no such collaboration.
    fn delete_collaboration(&self, playlist_id: &str, identity: &str) -> Result<bool>;

    fn insert_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<()>;

    /// Removes every occurrence of the song from the playlist and returns how
    /// many rows went away.
    fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<usize>;

    /// Songs in insertion order.
    fn list_playlist_songs(&self, playlist_id: &str) -> Result<Vec<SongSummary>>;

    fn count_playlists(&self) -> Result<usize>;
}

pub trait ActivityStore: Send + Sync {
    /// Appends an activity and returns its row id.
    fn append_activity(&self, activity: &NewActivity) -> Result<i64>;

    /// Activities of a playlist, oldest first.
    fn list_activities(&self, playlist_id: &str) -> Result<Vec<Activity>>;
}

pub trait LikeStore: Send + Sync {
    /// Returns false if the user already liked the album.
    fn insert_like(&self, album_id: &str, user_id: &str) -> Result<bool>;

    /// Returns false if the user had not liked the album.
    fn delete_like(&self, album_id: &str, user_id: &str) -> Result<bool>;

    fn has_like(&self, album_id: &str, user_id: &str) -> Result<bool>;

    fn count_likes(&self, album_id: &str) -> Result<u64>;
}

/// Every catalog storage capability in one object.
pub trait CatalogStore: AlbumStore + SongStore + PlaylistStore + ActivityStore + LikeStore {}

impl<T: AlbumStore + SongStore + PlaylistStore + ActivityStore + LikeStore> CatalogStore for T {}
