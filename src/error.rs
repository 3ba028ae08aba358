use std::path::PathBuf;

use thiserror::Error;

use crate::recording::RecordingProgress;

/// Failures of the recording store.
///
/// Missing rows are not errors: lookups return `Ok(None)` and updates `Ok(false)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store is in use by another process (lock file: {})", path.display())]
    Locked { path: PathBuf },

    #[error("an unfinished draft already exists (id {id})")]
    DraftExists { id: i64 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no session is in progress")]
    NoActiveDraft,

    #[error("session is incomplete ({} of 3 steps done)", .0.completed_steps())]
    Incomplete(RecordingProgress),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
