//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own databases in a temp dir.

use super::constants::*;
use super::fixtures::seed_catalog;
use openmusic_catalog_server::cache::{CacheLayer, InMemoryCacheStore};
use openmusic_catalog_server::catalog_store::SqliteCatalogStore;
use openmusic_catalog_server::export::SqliteMessageQueue;
use openmusic_catalog_server::server::{
    make_app, RequestsLoggingLevel, ServerConfig, ServerState, TokenVerifier,
};
use openmusic_catalog_server::CatalogServices;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Direct store access for assertions
    pub catalog_store: Arc<SqliteCatalogStore>,

    /// The export outbox, to observe published jobs
    pub export_queue: Arc<SqliteMessageQueue>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port, with a seeded catalog.
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");

        let catalog_store = Arc::new(
            SqliteCatalogStore::new(temp_db_dir.path().join("catalog.db"))
                .expect("Failed to open catalog store"),
        );
        seed_catalog(&catalog_store).expect("Failed to seed catalog");

        let export_queue = Arc::new(
            SqliteMessageQueue::new(temp_db_dir.path().join("export_queue.db"))
                .expect("Failed to open export queue"),
        );

        let cache = CacheLayer::new(
            Arc::new(InMemoryCacheStore::new()),
            Duration::from_secs(1800),
        );
        let services = CatalogServices::new(catalog_store.clone(), cache, export_queue.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = ServerState::new(
            ServerConfig {
                port,
                requests_logging_level: RequestsLoggingLevel::None,
            },
            services,
            TokenVerifier::new(JWT_SECRET),
            "test".to_string(),
        );
        let app = make_app(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            catalog_store,
            export_queue,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
