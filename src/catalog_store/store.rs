//! SQLite-backed catalog store.

use super::models::{
    Activity, ActivityAction, Album, AlbumInput, AlbumSummary, NewActivity, Playlist, Song,
    SongFilter, SongInput, SongSummary,
};
use super::schema::{
    ALBUMS_TABLE, ALBUM_LIKES_TABLE, CATALOG_VERSIONED_SCHEMAS, COLLABORATIONS_TABLE,
    PLAYLISTS_TABLE, PLAYLIST_ACTIVITIES_TABLE, PLAYLIST_SONGS_TABLE, SONGS_TABLE,
};
use super::trait_def::{ActivityStore, AlbumStore, LikeStore, PlaylistStore, SongStore};
use crate::sqlite_persistence::{open_in_memory_db, open_versioned_db};
use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, CATALOG_VERSIONED_SCHEMAS)?;
        Ok(SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = open_in_memory_db(CATALOG_VERSIONED_SCHEMAS)?;
        Ok(SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}

fn song_summary_from_row(row: &Row) -> rusqlite::Result<SongSummary> {
    Ok(SongSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        performer: row.get(2)?,
    })
}

/// Escapes `%`, `_` and `\` so user input only matches literally inside LIKE.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn playlist_from_row(row: &Row) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        id: row.get(0)?,
        name: row.get(1)?,
        owner: row.get(2)?,
    })
}

impl AlbumStore for SqliteCatalogStore {
    fn insert_album(&self, album: &Album) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, year, cover_url) VALUES (?1, ?2, ?3, ?4)",
                ALBUMS_TABLE.name
            ),
            params![album.id, album.name, album.year, album.cover_url],
        )
        .with_context(|| format!("Failed to insert album {}", album.id))?;
        Ok(())
    }

    fn get_album(&self, id: &str) -> Result<Option<Album>> {
        let conn = self.conn.lock().unwrap();
        let album = conn
            .query_row(
                &format!(
                    "SELECT id, name, year, cover_url FROM {} WHERE id = ?1",
                    ALBUMS_TABLE.name
                ),
                params![id],
                |row| {
                    Ok(Album {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        year: row.get(2)?,
                        cover_url: row.get(3)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("Failed to read album {}", id))?;
        Ok(album)
    }

    fn list_albums(&self) -> Result<Vec<AlbumSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT a.id, a.name, a.year, a.cover_url, COUNT(s.id)
             FROM {} a LEFT JOIN {} s ON s.album_id = a.id
             GROUP BY a.id ORDER BY a.rowid",
            ALBUMS_TABLE.name, SONGS_TABLE.name
        ))?;
        let albums = stmt
            .query_map([], |row| {
                Ok(AlbumSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    year: row.get(2)?,
                    cover_url: row.get(3)?,
                    song_count: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    fn update_album(&self, id: &str, input: &AlbumInput) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!(
                    "UPDATE {} SET name = ?1, year = ?2 WHERE id = ?3",
                    ALBUMS_TABLE.name
                ),
                params![input.name, input.year, id],
            )
            .with_context(|| format!("Failed to update album {}", id))?;
        Ok(changed > 0)
    }

    fn set_album_cover(&self, id: &str, cover_url: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!("UPDATE {} SET cover_url = ?1 WHERE id = ?2", ALBUMS_TABLE.name),
                params![cover_url, id],
            )
            .with_context(|| format!("Failed to set cover of album {}", id))?;
        Ok(changed > 0)
    }

    fn delete_album(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", ALBUMS_TABLE.name),
                params![id],
            )
            .with_context(|| format!("Failed to delete album {}", id))?;
        Ok(changed > 0)
    }

    fn count_albums(&self) -> Result<usize> {
        self.count(ALBUMS_TABLE.name)
    }
}

impl SongStore for SqliteCatalogStore {
    fn insert_song(&self, song: &Song) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, title, year, genre, performer, duration, album_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                SONGS_TABLE.name
            ),
            params![
                song.id,
                song.title,
                song.year,
                song.genre,
                song.performer,
                song.duration,
                song.album_id
            ],
        )
        .with_context(|| format!("Failed to insert song {}", song.id))?;
        Ok(())
    }

    fn get_song(&self, id: &str) -> Result<Option<Song>> {
        let conn = self.conn.lock().unwrap();
        let song = conn
            .query_row(
                &format!(
                    "SELECT id, title, year, genre, performer, duration, album_id
                     FROM {} WHERE id = ?1",
                    SONGS_TABLE.name
                ),
                params![id],
                |row| {
                    Ok(Song {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        year: row.get(2)?,
                        genre: row.get(3)?,
                        performer: row.get(4)?,
                        duration: row.get(5)?,
                        album_id: row.get(6)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("Failed to read song {}", id))?;
        Ok(song)
    }

    fn list_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, title, performer FROM {}
             WHERE (?1 IS NULL OR LOWER(title) LIKE '%' || LOWER(?1) || '%' ESCAPE '\\')
               AND (?2 IS NULL OR LOWER(performer) LIKE '%' || LOWER(?2) || '%' ESCAPE '\\')
             ORDER BY rowid",
            SONGS_TABLE.name
        ))?;
        let title = filter.title.as_deref().map(escape_like);
        let performer = filter.performer.as_deref().map(escape_like);
        let songs = stmt
            .query_map(
                params![title, performer],
                song_summary_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn list_songs_by_album(&self, album_id: &str) -> Result<Vec<SongSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, title, performer FROM {} WHERE album_id = ?1 ORDER BY rowid",
            SONGS_TABLE.name
        ))?;
        let songs = stmt
            .query_map(params![album_id], song_summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn update_song(&self, id: &str, input: &SongInput) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!(
                    "UPDATE {} SET title = ?1, year = ?2, genre = ?3, performer = ?4,
                     duration = ?5, album_id = ?6 WHERE id = ?7",
                    SONGS_TABLE.name
                ),
                params![
                    input.title,
                    input.year,
                    input.genre,
                    input.performer,
                    input.duration,
                    input.album_id,
                    id
                ],
            )
            .with_context(|| format!("Failed to update song {}", id))?;
        Ok(changed > 0)
    }

    fn delete_song(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", SONGS_TABLE.name),
                params![id],
            )
            .with_context(|| format!("Failed to delete song {}", id))?;
        Ok(changed > 0)
    }

    fn count_songs(&self) -> Result<usize> {
        self.count(SONGS_TABLE.name)
    }
}

impl PlaylistStore for SqliteCatalogStore {
    fn insert_playlist(&self, playlist: &Playlist) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, owner) VALUES (?1, ?2, ?3)",
                PLAYLISTS_TABLE.name
            ),
            params![playlist.id, playlist.name, playlist.owner],
        )
        .with_context(|| format!("Failed to insert playlist {}", playlist.id))?;
        Ok(())
    }

    fn get_playlist(&self, id: &str) -> Result<Option<Playlist>> {
        let conn = self.conn.lock().unwrap();
        let playlist = conn
            .query_row(
                &format!(
                    "SELECT id, name, owner FROM {} WHERE id = ?1",
                    PLAYLISTS_TABLE.name
                ),
                params![id],
                playlist_from_row,
            )
            .optional()
            .with_context(|| format!("Failed to read playlist {}", id))?;
        Ok(playlist)
    }

    fn list_playlists_for(&self, identity: &str) -> Result<Vec<Playlist>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT p.id, p.name, p.owner FROM {} p
             WHERE p.owner = ?1
                OR EXISTS (SELECT 1 FROM {} c WHERE c.playlist_id = p.id AND c.user_id = ?1)
             ORDER BY p.rowid",
            PLAYLISTS_TABLE.name, COLLABORATIONS_TABLE.name
        ))?;
        let playlists = stmt
            .query_map(params![identity], playlist_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(playlists)
    }

    fn delete_playlist(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", PLAYLISTS_TABLE.name),
                params![id],
            )
            .with_context(|| format!("Failed to delete playlist {}", id))?;
        Ok(changed > 0)
    }

    fn is_collaborator(&self, playlist_id: &str, identity: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE playlist_id = ?1 AND user_id = ?2",
                COLLABORATIONS_TABLE.name
            ),
            params![playlist_id, identity],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_collaboration(&self, playlist_id: &str, identity: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO {} (playlist_id, user_id) VALUES (?1, ?2)",
                    COLLABORATIONS_TABLE.name
                ),
                params![playlist_id, identity],
            )
            .with_context(|| {
                format!(
                    "Failed to add collaborator {} to playlist {}",
                    identity, playlist_id
                )
            })?;
        Ok(changed > 0)
    }

    fn delete_collaboration(&self, playlist_id: &str, identity: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE playlist_id = ?1 AND user_id = ?2",
                COLLABORATIONS_TABLE.name
            ),
            params![playlist_id, identity],
        )?;
        Ok(changed > 0)
    }

    fn insert_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (playlist_id, song_id) VALUES (?1, ?2)",
                PLAYLIST_SONGS_TABLE.name
            ),
            params![playlist_id, song_id],
        )
        .with_context(|| format!("Failed to add song {} to playlist {}", song_id, playlist_id))?;
        Ok(())
    }

    fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE playlist_id = ?1 AND song_id = ?2",
                PLAYLIST_SONGS_TABLE.name
            ),
            params![playlist_id, song_id],
        )?;
        Ok(changed)
    }

    fn list_playlist_songs(&self, playlist_id: &str) -> Result<Vec<SongSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT s.id, s.title, s.performer FROM {} ps
             JOIN {} s ON s.id = ps.song_id
             WHERE ps.playlist_id = ?1 ORDER BY ps.id",
            PLAYLIST_SONGS_TABLE.name, SONGS_TABLE.name
        ))?;
        let songs = stmt
            .query_map(params![playlist_id], song_summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn count_playlists(&self) -> Result<usize> {
        self.count(PLAYLISTS_TABLE.name)
    }
}

impl ActivityStore for SqliteCatalogStore {
    fn append_activity(&self, activity: &NewActivity) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (playlist_id, song_id, actor, action, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                PLAYLIST_ACTIVITIES_TABLE.name
            ),
            params![
                activity.playlist_id,
                activity.song_id,
                activity.actor,
                activity.action.as_str(),
                activity.timestamp.timestamp_millis()
            ],
        )
        .with_context(|| {
            format!(
                "Failed to record {} activity on playlist {}",
                activity.action, activity.playlist_id
            )
        })?;
        Ok(conn.last_insert_rowid())
    }

    fn list_activities(&self, playlist_id: &str) -> Result<Vec<Activity>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT a.id, a.playlist_id, a.song_id, s.title, a.actor, a.action, a.created_at
             FROM {} a LEFT JOIN {} s ON s.id = a.song_id
             WHERE a.playlist_id = ?1 ORDER BY a.created_at, a.id",
            PLAYLIST_ACTIVITIES_TABLE.name, SONGS_TABLE.name
        ))?;
        let rows = stmt
            .query_map(params![playlist_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, playlist_id, song_id, song_title, actor, action, created_at)| -> Result<Activity> {
                    let action = ActivityAction::from_db_str(&action)
                        .ok_or_else(|| anyhow!("Unknown activity action '{}'", action))?;
                    let timestamp = DateTime::from_timestamp_millis(created_at)
                        .ok_or_else(|| anyhow!("Invalid activity timestamp {}", created_at))?;
                    Ok(Activity {
                        id,
                        playlist_id,
                        song_id,
                        song_title,
                        actor,
                        action,
                        timestamp,
                    })
                },
            )
            .collect()
    }
}

impl LikeStore for SqliteCatalogStore {
    fn insert_like(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO {} (album_id, user_id) VALUES (?1, ?2)",
                    ALBUM_LIKES_TABLE.name
                ),
                params![album_id, user_id],
            )
            .with_context(|| format!("Failed to like album {}", album_id))?;
        Ok(changed > 0)
    }

    fn delete_like(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE album_id = ?1 AND user_id = ?2",
                ALBUM_LIKES_TABLE.name
            ),
            params![album_id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn has_like(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE album_id = ?1 AND user_id = ?2",
                ALBUM_LIKES_TABLE.name
            ),
            params![album_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn count_likes(&self, album_id: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE album_id = ?1",
                ALBUM_LIKES_TABLE.name
            ),
            params![album_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
