//! Bridge error types.

use thiserror::Error;

/// Errors surfaced by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Failed to launch the rendering engine.
    #[error("Failed to launch rendering engine: {0}")]
    LaunchFailed(String),

    /// Failed to create a page inside the engine.
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Navigation failed inside the engine.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The dispatched operation name is not registered in the rendering context.
    #[error("Unknown remote operation: {0}")]
    UnknownOperation(String),

    /// The transport payload was missing or malformed.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Transport-level evaluation failure, passed through uninterpreted.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// A wait or dispatch exceeded its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
