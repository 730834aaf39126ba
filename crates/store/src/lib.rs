//! Storage layer for the muster tracker: the key-value backend abstraction,
//! the keyspace conventions, the peer registry and the statistics sets.

use thiserror::Error;

pub mod backend;
pub mod key;
pub mod registry;
pub mod statistics;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation. Never
    /// retried here; callers decide whether the request dies with it.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("record serialization failed")]
    Serialize(#[from] serde_json::Error),
}
