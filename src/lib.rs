#![forbid(unsafe_code)]

//! gallery: labeled embedding storage and stratified dataset splitting.
//!
//! Two independent components, loosely coupled through the shape of a
//! labeled embedding record:
//!
//! - [`index`]: an in-memory gallery of `(id, vector, label, source)`
//!   records keyed by a unique `source` string, with exact (brute-force L2)
//!   nearest-neighbor search, in-place update, and removal.
//! - [`split`]: a deterministic stratified train/test partitioner for
//!   labeled item collections, with per-class minimum-count guarantees.
//!
//! An embedding producer typically reads items from a [`split::SplitDataset`],
//! computes vectors for them, and writes those into an
//! [`index::EmbeddingIndex`]. Neither module depends on the other.
//!
//! # Why exact search
//!
//! The gallery targets collections in the hundreds-to-thousands range
//! (one record per enrolled item), where a full scan beats graph- and
//! tree-based structures and is trivially exact. The scan structure is an
//! implementation detail: results are defined by L2 distance over the
//! current record vectors, with ties broken by ascending insertion id.
//!
//! # Example
//!
//! ```
//! use gallery::EmbeddingIndex;
//!
//! let mut index = EmbeddingIndex::new(3)?;
//! index.add(vec![1.0, 0.0, 0.0], "manta", "reef/a.jpg")?;
//! index.add(vec![0.0, 1.0, 0.0], "turtle", "reef/b.jpg")?;
//!
//! index.update("reef/a.jpg", vec![0.0, 0.9, 0.0], None)?;
//!
//! let hits = index.search(&[0.0, 1.0, 0.0], 1)?;
//! assert_eq!(hits[0].source, "reef/b.jpg");
//! # Ok::<(), gallery::IndexError>(())
//! ```

pub mod distance;
pub mod index;
pub mod split;

pub use index::{EmbeddingIndex, IndexError, Record, RecordId, SearchHit};
pub use split::{
    ItemLoader, LabeledItem, RawLoader, SplitConfig, SplitDataset, SplitError, StratifiedSplit,
    Subset,
};
