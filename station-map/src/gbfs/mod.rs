//! GBFS feed client and decoder.
//!
//! Two feeds describe a bike-share system:
//! - `station_information`: where each station is (changes rarely)
//! - `station_status`: how many bikes and docks are free right now
//!
//! Both share the GBFS envelope (`ttl`, `version`, `last_updated`, `data`).
//! Wire-format quirks (integer flags, numeric ids) are absorbed by the
//! decoder so the rest of the crate only sees [`crate::domain`] types.

mod client;
mod decode;
mod error;
mod mock;
mod types;

pub use client::{
    DEFAULT_INFORMATION_URL, DEFAULT_STATUS_URL, FeedClient, FeedConfig, FeedSource,
};
pub use decode::{Decoded, RecordList, decode, decode_information, decode_status};
pub use error::{DecodeError, FetchError};
pub use mock::MockFeed;
pub use types::{FeedKind, FeedMetadata};
