//! Typed error taxonomy shared by the store, repositories and API layer.
//!
//! Repositories fail with these variants (or return `None`/empty for
//! not-found reads) and never format HTTP responses themselves; the API
//! layer owns the mapping to status codes and client-visible bodies.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid required input. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity is absent. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// The operation would violate an invariant (duplicate category name,
    /// deleting a referenced category). Maps to 400.
    #[error("{0}")]
    Conflict(String),

    /// Purchase rejected: balance below cost. Carries the balance read
    /// inside the purchase transaction so callers can echo it.
    #[error("insufficient funds: balance is {balance}")]
    InsufficientFunds { balance: i64 },

    /// Purchase attempted for a user record that does not exist.
    #[error("user record does not exist")]
    UserNotFound,

    /// The underlying store failed or returned an unexpected shape.
    /// Logged server-side; clients see a generic 500.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

/// Failures originating below the repository layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("document codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document body: {0}")]
    Malformed(String),

    #[error("migration failed: {0:#}")]
    Migration(#[source] anyhow::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Store(StoreError::Io(e))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Store(StoreError::Codec(e))
    }
}
