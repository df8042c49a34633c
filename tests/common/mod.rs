//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, USER_U};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_list_albums() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::authenticated(server.base_url.clone(), USER_U);
//!
//!     let response = client.get_albums().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use fixtures::{
    bloom_input, mint_token, seed_catalog, song_input, FailingActivityStore, FailingCacheStore,
    FailingMessageQueue, ServiceHarness,
};
pub use server::TestServer;
