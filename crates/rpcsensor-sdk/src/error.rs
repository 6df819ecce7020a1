//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every fallible
//! operation in the SDK. It wraps underlying I/O, serialization and schema
//! errors into a unified enum.

use rpcsensor_models::ModelError;

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A payload did not match the message schema.
    #[error("schema error: {0}")]
    Model(#[from] ModelError),

    /// The peer is not reading: the outgoing queue is full and the message
    /// was dropped. The connection itself may still be up.
    #[error("outgoing queue full ({0} messages)")]
    QueueFull(usize),

    /// The connection is gone; nothing more can be sent.
    #[error("not connected")]
    Disconnected,

    /// The peer sent something that is valid JSON but not valid JSON-RPC.
    #[error("protocol error: {0}")]
    Protocol(String),
}
