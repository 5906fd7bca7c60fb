use thiserror::Error;

/// Errors raised by blobs and layers (the collaborators the checker drives).
#[derive(Error, Debug, PartialEq, Clone)]
pub enum LayerError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Blob creation error: data length {data_len} does not match shape {shape:?}")]
    BlobCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Buffer length mismatch in {operation}: blob holds {expected} elements, got {actual}")]
    BufferLengthMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("{layer} layer expects {expected} {role} blob(s), got {actual}")]
    BlobCountMismatch {
        layer: &'static str,
        role: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("propagate_down has {actual} flag(s) but the layer has {expected} bottom(s)")]
    PropagateDownMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
