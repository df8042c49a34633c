//! Error taxonomy shared by the catalog services.

use thiserror::Error;

/// Errors surfaced by catalog operations.
///
/// `NotFound`, `Forbidden` and `Invariant` are propagated unchanged to the
/// caller. `Unavailable` is only ever returned by operations that cannot fall
/// back to the source of truth (export dispatch); cache outages never reach
/// this type.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Invariant(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn not_found(what: &str, id: &str) -> Self {
        CatalogError::NotFound(format!("{} {} not found", what, id))
    }

    /// Short machine-readable category, used for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Forbidden(_) => "forbidden",
            CatalogError::Invariant(_) => "invariant",
            CatalogError::Unavailable(_) => "unavailable",
            CatalogError::Store(_) => "store",
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
