use reqwest::StatusCode;
use thiserror::Error;

use crate::{config::ConfigError, ulid::DecodeError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by the transport. Passed through untouched.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("token contains characters not allowed in a header")]
    InvalidToken,
}

impl TransportError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request(e) => e.status(),
            Self::Status { status, .. } => Some(*status),
            Self::InvalidToken => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed id: {0}")]
    InvalidId(#[from] DecodeError),

    #[error("could not serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("unexpected response body: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed id or response body that does not match the expected shape.
    Decode,
    Serialization,
    Transport,
    Config,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidId(_) | Self::Deserialize(_) => ErrorKind::Decode,
            Self::Serialize(_) => ErrorKind::Serialization,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
