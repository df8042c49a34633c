//! SQLite schema for the catalog database.
//!
//! Songs keep living when their album goes away (`album_id` is nulled), while
//! likes, collaborations and playlist entries follow their parents. Activities
//! carry no foreign keys: the audit trail outlives the rows it talks about.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

pub const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("cover_url", &SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[],
};

pub const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("performer", &SqlType::Text, non_null = true),
        sqlite_column!("duration", &SqlType::Integer),
        sqlite_column!(
            "album_id",
            &SqlType::Text,
            foreign_key = Some(&ForeignKey {
                foreign_table: "albums",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::SetNull,
            })
        ),
    ],
    indices: &[("idx_songs_album_id", "album_id")],
    unique_constraints: &[],
};

pub const PLAYLISTS_TABLE: Table = Table {
    name: "playlists",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("owner", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_playlists_owner", "owner")],
    unique_constraints: &[],
};

pub const COLLABORATIONS_TABLE: Table = Table {
    name: "collaborations",
    columns: &[
        sqlite_column!(
            "playlist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "playlists",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_collaborations_user_id", "user_id")],
    unique_constraints: &[&["playlist_id", "user_id"]],
};

pub const PLAYLIST_SONGS_TABLE: Table = Table {
    name: "playlist_songs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "playlist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "playlists",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "songs",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
    ],
    indices: &[("idx_playlist_songs_playlist_id", "playlist_id")],
    unique_constraints: &[],
};

pub const PLAYLIST_ACTIVITIES_TABLE: Table = Table {
    name: "playlist_activities",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("playlist_id", &SqlType::Text, non_null = true),
        sqlite_column!("song_id", &SqlType::Text, non_null = true),
        sqlite_column!("actor", &SqlType::Text, non_null = true),
        sqlite_column!("action", &SqlType::Text, non_null = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_playlist_activities_playlist_id", "playlist_id")],
    unique_constraints: &[],
};

pub const ALBUM_LIKES_TABLE: Table = Table {
    name: "album_likes",
    columns: &[
        sqlite_column!(
            "album_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "albums",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[&["album_id", "user_id"]],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        ALBUMS_TABLE,
        SONGS_TABLE,
        PLAYLISTS_TABLE,
        COLLABORATIONS_TABLE,
        PLAYLIST_SONGS_TABLE,
        PLAYLIST_ACTIVITIES_TABLE,
        ALBUM_LIKES_TABLE,
    ],
    migration: None,
}];
