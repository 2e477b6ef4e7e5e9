//! Error taxonomy for playlist conversion.
//!
//! Per-track failures (`NotFound`, exhausted `RateLimited`, `Transport` during a
//! search) are recovered by the scheduler: the slot stays empty and the run
//! continues. Session, configuration and cancellation errors end the run.
//! Write-phase errors end the write phase but leave resolved data intact.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    #[error("could not find track \"{query}\"")]
    NotFound { query: String },

    #[error("rate limited, gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("playlist write failed: {reason}")]
    Write { reason: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("run cancelled")]
    Cancelled,

    #[error("missing configuration value {key}")]
    Config { key: &'static str },

    #[error("source playlist unavailable: {reason}")]
    Source { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub fn auth(reason: impl Into<String>) -> Self {
        SyncError::Auth {
            reason: reason.into(),
        }
    }

    pub fn write(reason: impl Into<String>) -> Self {
        SyncError::Write {
            reason: reason.into(),
        }
    }

    pub fn source(reason: impl Into<String>) -> Self {
        SyncError::Source {
            reason: reason.into(),
        }
    }

    /// Errors after which no further track can be resolved.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Auth { .. } | SyncError::Cancelled | SyncError::Config { .. }
        )
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
