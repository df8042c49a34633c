use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use openmusic_catalog_server::cache::{
    run_cache_sweeper, CacheLayer, InMemoryCacheStore, DEFAULT_CACHE_TTL_SECS,
};
use openmusic_catalog_server::catalog_store::{
    AlbumStore, PlaylistStore, SongStore, SqliteCatalogStore,
};
use openmusic_catalog_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_CACHE_SWEEP_INTERVAL_SECS,
};
use openmusic_catalog_server::export::SqliteMessageQueue;
use openmusic_catalog_server::server::{self, ServerConfig, ServerState, TokenVerifier};
use openmusic_catalog_server::{CatalogServices, RequestsLoggingLevel};
use tokio_util::sync::CancellationToken;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the catalog and export queue databases.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Optional TOML config file. Values found there override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Secret used to verify the HS256 access tokens.
    #[clap(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Time-to-live of cached reads, in seconds.
    #[clap(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_sec: u64,

    /// Disables the read cache, every read goes to the database.
    #[clap(long)]
    pub no_cache: bool,

    /// Interval between purges of expired cache entries, in seconds.
    #[clap(long, default_value_t = DEFAULT_CACHE_SWEEP_INTERVAL_SECS)]
    pub cache_sweep_interval_sec: u64,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            jwt_secret: args.jwt_secret.clone(),
            cache_enabled: !args.no_cache,
            cache_ttl_sec: args.cache_ttl_sec,
            cache_sweep_interval_sec: args.cache_sweep_interval_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    info!(
        "Opening SQLite catalog database at {:?}...",
        config.catalog_db_path()
    );
    let catalog_store = Arc::new(SqliteCatalogStore::new(config.catalog_db_path())?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();
    server::metrics::init_catalog_metrics(
        catalog_store.count_albums()?,
        catalog_store.count_songs()?,
        catalog_store.count_playlists()?,
    );

    info!(
        "Opening export queue database at {:?}...",
        config.export_queue_db_path()
    );
    let export_queue = Arc::new(SqliteMessageQueue::new(config.export_queue_db_path())?);

    let shutdown_token = CancellationToken::new();
    let cache = if config.cache.enabled {
        let cache_store = Arc::new(InMemoryCacheStore::new());
        tokio::spawn(run_cache_sweeper(
            cache_store.clone(),
            config.cache.sweep_interval,
            shutdown_token.clone(),
        ));
        info!("Read cache enabled, ttl {:?}", config.cache.ttl);
        CacheLayer::new(cache_store, config.cache.ttl)
    } else {
        info!("Read cache disabled");
        CacheLayer::disabled()
    };

    let services = CatalogServices::new(catalog_store, cache, export_queue);
    let state = ServerState::new(
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
        },
        services,
        TokenVerifier::new(&config.jwt_secret),
        env!("GIT_HASH").to_string(),
    );

    info!("Ready to serve at port {}!", config.port);
    let result = server::run_server(state).await;
    shutdown_token.cancel();
    result
}
