//! OpenMusic Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod activity;
pub mod authorization;
pub mod cache;
pub mod catalog_store;
pub mod config;
pub mod error;
pub mod export;
pub mod server;
pub mod services;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use authorization::Identity;
pub use error::{CatalogError, CatalogResult};
pub use server::{run_server, RequestsLoggingLevel};
pub use services::CatalogServices;
