//! Error taxonomy for an export run

use thiserror::Error;

/// Coarse classification of a failure, by pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Connection,
    Fetch,
    Encode,
    Upload,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Config => write!(f, "config"),
            Stage::Connection => write!(f, "connection"),
            Stage::Fetch => write!(f, "fetch"),
            Stage::Encode => write!(f, "encode"),
            Stage::Upload => write!(f, "upload"),
        }
    }
}

/// Every error an export run can end with. None of them are retried.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to connect to Redis at {address}")]
    Connection {
        address: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Failed to list keys matching {pattern:?}")]
    Enumerate {
        pattern: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Key is not valid UTF-8: {lossy:?}")]
    InvalidKey { lossy: String },

    #[error("Failed to fetch value for key {key:?}")]
    Fetch {
        key: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Key {key:?} disappeared between enumeration and fetch")]
    MissingValue { key: String },

    #[error("Failed to encode CSV document")]
    Encode(#[from] csv::Error),

    #[error("Missing credentials: {0}")]
    Credentials(String),

    #[error("Upload rejected with status {status}: {message}")]
    Upload { status: u16, message: String },

    #[error("Upload request failed")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl ExportError {
    /// The stage this error aborted
    pub fn stage(&self) -> Stage {
        match self {
            ExportError::Connection { .. } | ExportError::Enumerate { .. } => Stage::Connection,
            ExportError::InvalidKey { .. }
            | ExportError::Fetch { .. }
            | ExportError::MissingValue { .. } => Stage::Fetch,
            ExportError::Encode(_) => Stage::Encode,
            ExportError::Upload { .. }
            | ExportError::Transport(_)
            | ExportError::InvalidObjectKey(_)
            | ExportError::Io(_) => Stage::Upload,
            ExportError::Credentials(_) | ExportError::Config(_) => Stage::Config,
        }
    }
}
