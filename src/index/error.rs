//! Error types for the embedding index.

use thiserror::Error;

/// Errors that can occur while mutating or querying an
/// [`EmbeddingIndex`](super::EmbeddingIndex).
///
/// Every failing operation leaves the index exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A live record already exists for this source key. Replacement goes
    /// through `update`, never through a second `add`.
    #[error("duplicate source: {0:?} already has a live record")]
    DuplicateSource(String),

    /// No live record for this source key.
    #[error("source not found: {0:?}")]
    NotFound(String),

    /// Vector length differs from the dimension fixed at construction.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Index constructed with a zero dimension.
    #[error("dimension must be greater than 0")]
    InvalidDimension,
}
