//! Error types
//!
//! - `LoadError` - catalog sources or snapshots unusable at startup. Fatal.
//! - `StoreError` - conversation store lookups that the caller recovers from.
//! - `PersistenceError` - a snapshot write after a mutation failed. Logged only.
//!
//! Malformed catalog lines are not errors: the parser skips them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("no conversation record for user {0}")]
    NotFound(i64),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode conversations: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to render conversations: {0}")]
    Render(#[from] minijinja::Error),
}
