//! Cache key naming.

pub const ALL_ALBUMS: &str = "albums:all";

/// Prefix shared by every playlist song listing.
pub const PLAYLIST_SONGS_PREFIX: &str = "playlist:songs:";

pub fn album(id: &str) -> String {
    format!("album:{}", id)
}

pub fn songs_by_album(album_id: &str) -> String {
    format!("songs:by-album:{}", album_id)
}

pub fn album_likes(album_id: &str) -> String {
    format!("album:likes:{}", album_id)
}

pub fn playlist_songs(playlist_id: &str) -> String {
    format!("{}{}", PLAYLIST_SONGS_PREFIX, playlist_id)
}

/// Key without its trailing id segment, used as a low-cardinality metrics label.
pub fn namespace(key: &str) -> &str {
    if key == ALL_ALBUMS {
        return key;
    }
    key.rsplit_once(':').map(|(ns, _)| ns).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_drop_the_id() {
        assert_eq!(namespace(&album("album-1")), "album");
        assert_eq!(namespace(&album_likes("album-1")), "album:likes");
        assert_eq!(namespace(&songs_by_album("album-1")), "songs:by-album");
        assert_eq!(namespace(&playlist_songs("playlist-1")), "playlist:songs");
        assert_eq!(namespace(ALL_ALBUMS), "albums:all");
    }

    #[test]
    fn playlist_keys_share_prefix() {
        assert!(playlist_songs("playlist-9").starts_with(PLAYLIST_SONGS_PREFIX));
    }
}
