//! Error types for injector-bridge.

use thiserror::Error;

/// Main error type for all bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O error on a stdio transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bound element rejected a read or write.
    #[error("Element error: {0}")]
    Element(String),

    /// An element rejected the shape of an inbound payload.
    #[error("Invalid payload for {kind}: {reason}")]
    InvalidPayload {
        /// Wire name of the message kind.
        kind: &'static str,
        /// What was wrong with the payload.
        reason: String,
    },

    /// `setup()` was called on a handler that is already set up.
    #[error("Handler already set up")]
    AlreadySetUp,

    /// The page message channel is closed.
    #[error("Channel closed")]
    ChannelClosed,

    /// The page message channel is full.
    #[error("Channel full")]
    Backpressure,
}

/// Result type alias using BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;
