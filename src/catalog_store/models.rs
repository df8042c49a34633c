//! Catalog data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub cover_url: Option<String>,
}

/// Album row as it appears in the album listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub cover_url: Option<String>,
    pub song_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlbumInput {
    pub name: String,
    pub year: i32,
}

/// An album together with the songs that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub album: Album,
    pub songs: Vec<SongSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<u32>,
    pub album_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongInput {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<u32>,
    pub album_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub performer: String,
}

/// Case-insensitive substring filters for the song listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongFilter {
    pub title: Option<String>,
    pub performer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Add,
    Delete,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Add => "add",
            ActivityAction::Delete => "delete",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "add" => Some(ActivityAction::Add),
            "delete" => Some(ActivityAction::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An activity about to be appended to a playlist's audit trail.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub playlist_id: String,
    pub song_id: String,
    pub actor: String,
    pub action: ActivityAction,
    pub timestamp: DateTime<Utc>,
}

/// A recorded playlist activity. `song_title` is resolved at read time and is
/// `None` once the song has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub playlist_id: String,
    pub song_id: String,
    pub song_title: Option<String>,
    pub actor: String,
    pub action: ActivityAction,
    pub timestamp: DateTime<Utc>,
}
