//! Error types for stratified splitting.

use thiserror::Error;

/// Errors that can occur while constructing or reading a stratified split.
///
/// Construction either fully succeeds or fully fails; there is no partial
/// best-effort split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// A class is too small to yield both the minimum train set and a
    /// non-empty test set.
    #[error("class {label:?} has only {count} samples")]
    InsufficientSamples { label: String, count: usize },

    /// Configuration rejected before any work was done.
    #[error("invalid split config: {0}")]
    InvalidConfig(String),

    /// Subset-relative index past the end of the active subset.
    #[error("index {index} out of bounds for subset of length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// I/O failure while walking a directory or loading an item.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SplitError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
