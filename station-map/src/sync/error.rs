//! Sync error types.

use crate::gbfs::{DecodeError, FeedKind, FetchError};

/// Why a refresh did not publish.
///
/// In every case the previously published feature set is left as it was.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    /// One of the feeds could not be retrieved
    #[error("failed to fetch station data: {0}")]
    Fetch(#[from] FetchError),

    /// One of the feeds could not be decoded
    #[error("failed to decode station data: {0}")]
    Decode(#[from] DecodeError),

    /// A newer refresh started, or the refresh was cancelled explicitly
    #[error("refresh cancelled")]
    Cancelled,
}

impl SyncError {
    /// The feed that failed, if the failure came from a feed.
    pub fn feed(&self) -> Option<FeedKind> {
        match self {
            SyncError::Fetch(e) => Some(e.kind()),
            SyncError::Decode(e) => Some(e.kind()),
            SyncError::Cancelled => None,
        }
    }
}
