//! Error types for layout builder operations.

use thiserror::Error;

/// Result type for layout builder operations.
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Errors that can occur in layout builder operations.
///
/// Every tree operation that returns one of these has left the tree exactly
/// as it was before the call.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// No element with this id exists anywhere in the tree.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The registry has no definition for this element type.
    #[error("Unknown element type: {0}")]
    UnknownElementType(String),

    /// The target element exists but cannot hold children.
    #[error("Element is not a container: {0}")]
    NotAContainer(String),

    /// The requested combination of targets is not supported.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document parsed as JSON but does not have the required shape.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

impl BuilderError {
    /// Whether this error means the target simply did not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound(_) | Self::UnknownElementType(_))
    }
}
