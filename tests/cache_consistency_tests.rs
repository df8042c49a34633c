//! Read-through cache behavior across the album and song services.

mod common;

use common::{
    bloom_input, song_input, FailingCacheStore, ServiceHarness, ALBUM_BLOOM_ID,
    SONG_WILDFLOWER_ID,
};
use openmusic_catalog_server::cache::{keys, CacheLayer, CacheStore, DataSource};
use openmusic_catalog_server::catalog_store::{AlbumInput, SongInput};
use openmusic_catalog_server::services::{AlbumService, LikeOutcome, SongService};
use openmusic_catalog_server::Identity;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn wildflower_is_listed_on_bloom() {
    let harness = ServiceHarness::new();

    let detail = harness.albums.get_album(ALBUM_BLOOM_ID).await.unwrap();

    assert_eq!(detail.value.album.name, "Bloom");
    assert_eq!(detail.value.songs.len(), 1);
    assert_eq!(detail.value.songs[0].id, SONG_WILDFLOWER_ID);
    assert_eq!(detail.value.songs[0].title, "Wildflower");
    assert_eq!(detail.value.songs[0].performer, "Ivy Lane");
}

#[tokio::test]
async fn created_song_shows_up_on_created_album() {
    let harness = ServiceHarness::new();
    let album_id = harness
        .albums
        .add_album(&AlbumInput {
            name: "Wildflower".to_string(),
            year: 2024,
        })
        .await
        .unwrap();
    // warm the album keys so the song insert has something to invalidate
    harness.albums.get_album(&album_id).await.unwrap();

    let song_id = harness
        .songs
        .add_song(&SongInput {
            title: "Bloom".to_string(),
            year: 2024,
            genre: "Folk".to_string(),
            performer: "A. Rose".to_string(),
            duration: None,
            album_id: Some(album_id.clone()),
        })
        .await
        .unwrap();

    let detail = harness.albums.get_album(&album_id).await.unwrap();
    assert_eq!(detail.value.album.name, "Wildflower");
    assert_eq!(detail.value.album.year, 2024);
    assert_eq!(detail.value.songs.len(), 1);
    assert_eq!(detail.value.songs[0].id, song_id);
    assert_eq!(detail.value.songs[0].title, "Bloom");
    assert_eq!(detail.value.songs[0].performer, "A. Rose");
}

#[tokio::test]
async fn cold_read_then_warm_read() {
    let harness = ServiceHarness::new();
    let id = harness.albums.add_album(&bloom_input()).await.unwrap();

    let cold = harness.albums.get_album(&id).await.unwrap();
    assert_eq!(cold.source, DataSource::Store);
    assert_eq!(cold.value.album.name, "Bloom");
    assert_eq!(cold.value.album.year, 2021);
    assert!(cold.value.songs.is_empty());

    let warm = harness.albums.get_album(&id).await.unwrap();
    assert_eq!(warm.source, DataSource::Cache);
    assert_eq!(warm.value, cold.value);
}

#[tokio::test]
async fn mutations_only_invalidate_their_keys() {
    let harness = ServiceHarness::new();
    let other = harness.albums.add_album(&bloom_input()).await.unwrap();

    harness.albums.get_album(ALBUM_BLOOM_ID).await.unwrap();
    harness.albums.get_album(&other).await.unwrap();
    harness.albums.likes(&other).await.unwrap();

    harness
        .albums
        .edit_album(
            ALBUM_BLOOM_ID,
            &AlbumInput {
                name: "Bloom (Deluxe)".to_string(),
                year: 2022,
            },
        )
        .await
        .unwrap();

    let edited = harness.albums.get_album(ALBUM_BLOOM_ID).await.unwrap();
    assert_eq!(edited.value.album.name, "Bloom (Deluxe)");
    assert_eq!(edited.value.album.year, 2022);

    // Untouched album and its like count are still served from the cache.
    assert!(harness.albums.get_album(&other).await.unwrap().is_from_cache());
    assert!(harness.albums.likes(&other).await.unwrap().is_from_cache());
}

#[tokio::test]
async fn song_changes_reach_album_listing() {
    let harness = ServiceHarness::new();
    let before = harness.albums.list_albums().await.unwrap();
    assert_eq!(before.value[0].song_count, 1);

    harness
        .songs
        .add_song(&song_input("Petals", Some(ALBUM_BLOOM_ID)))
        .await
        .unwrap();

    let after = harness.albums.list_albums().await.unwrap();
    assert_eq!(after.source, DataSource::Store);
    assert_eq!(after.value[0].song_count, 2);

    let detail = harness.albums.get_album(ALBUM_BLOOM_ID).await.unwrap();
    let titles: Vec<_> = detail.value.songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Wildflower", "Petals"]);
}

#[tokio::test]
async fn deleting_song_refreshes_album_and_playlists() {
    let harness = ServiceHarness::new();
    let owner = Identity::from("user-u");
    let playlist = harness
        .playlists
        .create_playlist("Roadtrip", &owner)
        .await
        .unwrap();
    harness
        .playlists
        .add_song(&playlist, SONG_WILDFLOWER_ID, &owner)
        .await
        .unwrap();
    harness.albums.get_album(ALBUM_BLOOM_ID).await.unwrap();
    harness
        .playlists
        .list_songs(&playlist, &owner)
        .await
        .unwrap();

    harness.songs.delete_song(SONG_WILDFLOWER_ID).await.unwrap();

    let album = harness.albums.get_album(ALBUM_BLOOM_ID).await.unwrap();
    assert!(album.value.songs.is_empty());
    let songs = harness
        .playlists
        .list_songs(&playlist, &owner)
        .await
        .unwrap();
    assert_eq!(songs.source, DataSource::Store);
    assert!(songs.value.songs.is_empty());
}

#[tokio::test]
async fn liking_twice_counts_once() {
    let harness = ServiceHarness::new();
    let ivy = Identity::from("user-ivy");

    harness.albums.like(ALBUM_BLOOM_ID, &ivy).await.unwrap();
    harness.albums.like(ALBUM_BLOOM_ID, &ivy).await.unwrap();
    harness
        .albums
        .like(ALBUM_BLOOM_ID, &Identity::from("user-rue"))
        .await
        .unwrap();

    assert_eq!(harness.albums.likes(ALBUM_BLOOM_ID).await.unwrap().value, 2);

    harness.albums.toggle_like(ALBUM_BLOOM_ID, &ivy).await.unwrap();
    let count = harness.albums.likes(ALBUM_BLOOM_ID).await.unwrap();
    assert_eq!(count.value, 1);
    assert_eq!(count.source, DataSource::Store);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_by_one_user_count_once() {
    let harness = ServiceHarness::new();
    let ivy = Identity::from("user-ivy");

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..16 {
        let albums = harness.albums.clone();
        let user = ivy.clone();
        tasks.spawn(async move { albums.like(ALBUM_BLOOM_ID, &user).await });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.unwrap().unwrap());
    }
    let liked = outcomes
        .iter()
        .filter(|outcome| **outcome == LikeOutcome::Liked)
        .count();
    assert_eq!(liked, 1);
    assert_eq!(outcomes.len() - liked, 15);
    assert!(outcomes
        .iter()
        .all(|outcome| matches!(outcome, LikeOutcome::Liked | LikeOutcome::AlreadyLiked)));

    assert_eq!(harness.albums.likes(ALBUM_BLOOM_ID).await.unwrap().value, 1);
}

#[tokio::test]
async fn album_keys_are_written_with_ttl() {
    let harness = ServiceHarness::new();
    harness.albums.get_album(ALBUM_BLOOM_ID).await.unwrap();

    assert!(harness
        .cache_store
        .get(&keys::album(ALBUM_BLOOM_ID))
        .await
        .unwrap()
        .is_some());
    assert!(harness
        .cache_store
        .get(&keys::songs_by_album(ALBUM_BLOOM_ID))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn failing_cache_never_fails_reads_or_writes() {
    let harness = ServiceHarness::new();
    let cache = CacheLayer::new(Arc::new(FailingCacheStore), Duration::from_secs(1800));
    let albums = AlbumService::new(harness.store.clone(), cache.clone());
    let songs = SongService::new(harness.store.clone(), cache);

    let id = albums.add_album(&bloom_input()).await.unwrap();
    songs
        .add_song(&song_input("Stems", Some(&id)))
        .await
        .unwrap();

    for _ in 0..2 {
        let detail = albums.get_album(&id).await.unwrap();
        assert_eq!(detail.source, DataSource::Store);
        assert_eq!(detail.value.songs.len(), 1);
    }

    let who = Identity::from("user-ivy");
    albums.toggle_like(&id, &who).await.unwrap();
    assert_eq!(albums.likes(&id).await.unwrap().value, 1);
    albums.delete_album(&id).await.unwrap();
}

#[tokio::test]
async fn disabled_cache_always_reads_the_store() {
    let harness = ServiceHarness::new();
    let albums = AlbumService::new(harness.store.clone(), CacheLayer::disabled());

    for _ in 0..2 {
        let listing = albums.list_albums().await.unwrap();
        assert_eq!(listing.source, DataSource::Store);
    }
}
