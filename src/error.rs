//! Error taxonomy shared by every pipeline stage.
//!
//! Lower-level components return [`AlbertError`]; only the per-file ingest
//! loop and the HTTP handlers catch it and turn it into a decision.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlbertError {
    /// The remote API answered with a non-2xx status.
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote API answered 2xx but the payload does not match its contract.
    #[error("unexpected response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    #[error("missing or invalid configuration: {0}")]
    Configuration(String),

    #[error("could not convert {}: {message}", .path.display())]
    Conversion { path: PathBuf, message: String },

    #[error("conversation has no messages")]
    EmptyConversation,
}

impl AlbertError {
    /// True for failures of the remote call itself (status or network).
    pub fn is_transport(&self) -> bool {
        matches!(self, AlbertError::Status { .. } | AlbertError::Network { .. })
    }

    pub(crate) fn conversion(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        AlbertError::Conversion {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T, E = AlbertError> = std::result::Result<T, E>;
