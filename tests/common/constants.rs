//! Shared constants for the integration tests

// ============================================================================
// Identities
// ============================================================================

/// Secret the test server verifies tokens with.
pub const JWT_SECRET: &str = "integration-test-secret";

/// Playlist owner in the scenarios.
pub const USER_U: &str = "user-u";

/// Another listener, collaborator once added.
pub const USER_V: &str = "user-v";

/// Never granted access to anything.
pub const USER_W: &str = "user-w";

// ============================================================================
// Seeded Catalog
// ============================================================================

pub const ALBUM_BLOOM_ID: &str = "album-bloom";
pub const SONG_WILDFLOWER_ID: &str = "song-wildflower";
pub const SONG_NIGHT_DRIVE_ID: &str = "song-night-drive";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
