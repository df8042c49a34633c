mod file_config;

pub use file_config::{CacheConfig, FileConfig};

use crate::cache::DEFAULT_CACHE_TTL_SECS;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CACHE_SWEEP_INTERVAL_SECS: u64 = 60;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub jwt_secret: Option<String>,
    pub cache_enabled: bool,
    pub cache_ttl_sec: u64,
    pub cache_sweep_interval_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub jwt_secret: String,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_CACHE_SWEEP_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let jwt_secret = file
            .jwt_secret
            .or_else(|| cli.jwt_secret.clone())
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("jwt_secret must be specified via --jwt-secret or in config file")
            })?;

        let cache_file = file.cache.unwrap_or_default();
        let ttl_sec = cache_file.ttl_sec.unwrap_or(cli.cache_ttl_sec);
        if ttl_sec == 0 {
            bail!("Cache TTL must be greater than zero");
        }
        let sweep_interval_sec = cache_file
            .sweep_interval_sec
            .unwrap_or(cli.cache_sweep_interval_sec)
            .max(1);
        let cache = CacheSettings {
            enabled: cache_file.enabled.unwrap_or(cli.cache_enabled),
            ttl: Duration::from_secs(ttl_sec),
            sweep_interval: Duration::from_secs(sweep_interval_sec),
        };

        Ok(AppConfig {
            db_dir,
            port,
            logging_level,
            jwt_secret,
            cache,
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join("catalog.db")
    }

    pub fn export_queue_db_path(&self) -> PathBuf {
        self.db_dir.join("export_queue.db")
    }
}

/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
