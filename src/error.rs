//! Crate-wide error type

use crate::feed::FeedError;
use crate::message::MessageError;

/// Any error raised while turning a tick into a relay message
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A raw tick could not be normalized or packed.
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// A message could not be serialized.
    #[error(transparent)]
    Message(#[from] MessageError),
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
