//! Error types for gridding operations.
//!
//! Every fallible operation in the NUFFT stack reports one of these
//! variants. Nothing is retried: gridding is a deterministic computation, so
//! an error always means the caller handed over something inconsistent.

use thiserror::Error;

/// Main error type for NUFFT operations.
#[derive(Error, Debug)]
pub enum NufftError {
    /// A caller-supplied array does not match the geometry-derived shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Grid range with `max <= min` on at least one axis.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Invalid operator or kernel configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested capability is not available in this build or environment.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Failure reported by an execution backend.
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Array construction from a flat buffer failed.
    #[error(transparent)]
    Layout(#[from] ndarray::ShapeError),
}

/// Result type for NUFFT operations.
pub type Result<T> = std::result::Result<T, NufftError>;

impl NufftError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a degenerate geometry error.
    pub fn degenerate_geometry(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an unsupported capability error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendError(msg.into())
    }
}

/// Check that `actual` matches `expected` exactly.
pub fn check_shape(expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected != actual {
        return Err(NufftError::shape_mismatch(expected, actual));
    }
    Ok(())
}
