//! Feed fetch and decode error types.

use super::types::FeedKind;

/// Errors from retrieving a feed over HTTP.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Network failure, timeout, or the body could not be read
    #[error("transport error fetching {kind}: {message}")]
    Transport { kind: FeedKind, message: String },

    /// The server answered with a non-success status
    #[error("{kind} returned HTTP {status} from {url}")]
    HttpStatus {
        kind: FeedKind,
        status: u16,
        url: String,
    },

    /// The client could not be built from its configuration
    #[error("invalid {kind} client configuration: {message}")]
    InvalidConfig { kind: FeedKind, message: String },
}

impl FetchError {
    /// The feed this error belongs to.
    pub fn kind(&self) -> FeedKind {
        match self {
            FetchError::Transport { kind, .. }
            | FetchError::HttpStatus { kind, .. }
            | FetchError::InvalidConfig { kind, .. } => *kind,
        }
    }
}

/// Errors from decoding a feed body.
///
/// An empty station list is not an error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// Required fields missing, of the wrong type, or not JSON at all
    #[error("malformed {kind}: {message}")]
    Malformed { kind: FeedKind, message: String },
}

impl DecodeError {
    /// The feed this error belongs to.
    pub fn kind(&self) -> FeedKind {
        match self {
            DecodeError::Malformed { kind, .. } => *kind,
        }
    }
}
