//! In-memory gallery of labeled embedding vectors.
//!
//! An [`EmbeddingIndex`] owns a set of records, each a
//! `(id, vector, label, source)` tuple:
//!
//! - `id` is assigned from an instance-owned monotonic counter at insertion
//!   and is never reused, not even after removal. Updating a source's vector
//!   keeps its id.
//! - `source` is a unique key (at most one live record per source); replacing
//!   a source's data goes through [`EmbeddingIndex::update`].
//!
//! # Bookkeeping
//!
//! The record table (`id → Record`) is the single root of truth. Two derived
//! maps (`source → id` and `label → {ids}`) are maintained incrementally on
//! every mutation, and the scan structure (`FlatL2`) always holds exactly
//! the ids present in the record table. The scan structure is a
//! performance accelerant only: search semantics are defined by L2 distance
//! over the current record vectors, ties broken by ascending id, and would be
//! unchanged under a naive scan of the record table.
//!
//! # Concurrency
//!
//! The index is a plain single-threaded data structure with no interior
//! locking; keeping the derived maps and the scan structure coherent requires
//! every mutation to be exclusive. Concurrent use goes behind an external
//! `RwLock` around the whole instance.

mod error;
mod flat;

pub use error::IndexError;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use flat::FlatL2;

/// Process-unique record identifier, monotonically increasing per index.
pub type RecordId = u64;

/// A live embedding record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub vector: Vec<f32>,
    pub label: String,
    pub source: String,
}

/// One nearest-neighbor search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// L2 distance from the query to the record's current vector.
    pub distance: f32,
    pub label: String,
    pub source: String,
}

/// Gallery of labeled, fixed-dimension embedding vectors keyed by source.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    dimension: usize,
    next_id: RecordId,
    records: BTreeMap<RecordId, Record>,
    source_to_id: HashMap<String, RecordId>,
    label_to_ids: BTreeMap<String, BTreeSet<RecordId>>,
    accel: FlatL2,
}

impl EmbeddingIndex {
    /// Create an empty index for vectors of the given dimension.
    ///
    /// The dimension is fixed for the life of the index; every vector passed
    /// to [`add`](Self::add), [`update`](Self::update), or
    /// [`search`](Self::search) must match it.
    pub fn new(dimension: usize) -> Result<Self, IndexError> {
        if dimension == 0 {
            return Err(IndexError::InvalidDimension);
        }
        Ok(Self {
            dimension,
            next_id: 0,
            records: BTreeMap::new(),
            source_to_id: HashMap::new(),
            label_to_ids: BTreeMap::new(),
            accel: FlatL2::new(dimension),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next successful [`add`](Self::add) will assign.
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    pub fn contains_source(&self, source: &str) -> bool {
        self.source_to_id.contains_key(source)
    }

    /// Insert a new record and return its id.
    ///
    /// Fails with [`IndexError::DuplicateSource`] if the source already has a
    /// live record; replacement goes through [`update`](Self::update).
    pub fn add(
        &mut self,
        vector: Vec<f32>,
        label: &str,
        source: &str,
    ) -> Result<RecordId, IndexError> {
        self.check_dimension(&vector)?;
        if self.source_to_id.contains_key(source) {
            return Err(IndexError::DuplicateSource(source.to_owned()));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.accel.insert(id, &vector);
        self.source_to_id.insert(source.to_owned(), id);
        self.label_to_ids
            .entry(label.to_owned())
            .or_default()
            .insert(id);
        self.records.insert(
            id,
            Record {
                vector,
                label: label.to_owned(),
                source: source.to_owned(),
            },
        );
        debug_assert_eq!(self.accel.len(), self.records.len());
        debug!(id, source, label, "added embedding record");
        Ok(id)
    }

    /// Replace a record's vector, and optionally its label, in place.
    ///
    /// The record keeps its id and source; no other record is touched.
    /// Fails with [`IndexError::NotFound`] for an unknown source and with
    /// [`IndexError::DimensionMismatch`] before any state changes.
    pub fn update(
        &mut self,
        source: &str,
        new_vector: Vec<f32>,
        new_label: Option<&str>,
    ) -> Result<(), IndexError> {
        self.check_dimension(&new_vector)?;
        let id = match self.source_to_id.get(source) {
            Some(&id) => id,
            None => return Err(IndexError::NotFound(source.to_owned())),
        };
        let mut record = match self.records.remove(&id) {
            Some(record) => record,
            None => return Err(IndexError::NotFound(source.to_owned())),
        };
        // Unconditional remove-then-reinsert: the scan structure's member set
        // stays identical to the record table through every update.
        debug_assert!(self.accel.contains(id));
        self.accel.remove(id);
        self.accel.insert(id, &new_vector);
        record.vector = new_vector;
        if let Some(new_label) = new_label {
            if new_label != record.label {
                self.unlink_label(&record.label, id);
                self.label_to_ids
                    .entry(new_label.to_owned())
                    .or_default()
                    .insert(id);
                record.label = new_label.to_owned();
            }
        }
        self.records.insert(id, record);
        debug!(id, source, "updated embedding record");
        Ok(())
    }

    /// Remove a record. Its id is retired, never reused.
    pub fn remove(&mut self, source: &str) -> Result<(), IndexError> {
        let id = match self.source_to_id.remove(source) {
            Some(id) => id,
            None => return Err(IndexError::NotFound(source.to_owned())),
        };
        self.accel.remove(id);
        if let Some(record) = self.records.remove(&id) {
            self.unlink_label(&record.label, id);
        }
        debug_assert_eq!(self.accel.len(), self.records.len());
        debug!(id, source, "removed embedding record");
        Ok(())
    }

    /// The current vector for a source.
    pub fn get_vector(&self, source: &str) -> Result<&[f32], IndexError> {
        self.source_to_id
            .get(source)
            .and_then(|id| self.records.get(id))
            .map(|record| record.vector.as_slice())
            .ok_or_else(|| IndexError::NotFound(source.to_owned()))
    }

    /// Vectors of every record carrying `label`, in ascending-id order.
    ///
    /// An unknown label is a valid query with no data: the result is empty,
    /// not an error.
    pub fn get_vectors_by_label(&self, label: &str) -> Vec<&[f32]> {
        self.ids_for_label(label)
            .filter_map(|id| self.records.get(&id))
            .map(|record| record.vector.as_slice())
            .collect()
    }

    /// Sources of every record carrying `label`, in ascending-id order.
    /// Same empty-on-unknown policy as [`get_vectors_by_label`](Self::get_vectors_by_label).
    pub fn get_sources_by_label(&self, label: &str) -> Vec<&str> {
        self.ids_for_label(label)
            .filter_map(|id| self.records.get(&id))
            .map(|record| record.source.as_str())
            .collect()
    }

    /// All live vectors, in ascending-id order.
    pub fn all_vectors(&self) -> Vec<&[f32]> {
        self.records
            .values()
            .map(|record| record.vector.as_slice())
            .collect()
    }

    /// All distinct live labels, in sorted order.
    pub fn all_labels(&self) -> Vec<&str> {
        self.label_to_ids.keys().map(String::as_str).collect()
    }

    /// All live sources, in ascending-id order.
    pub fn all_sources(&self) -> Vec<&str> {
        self.records
            .values()
            .map(|record| record.source.as_str())
            .collect()
    }

    /// Iterate over all live records in ascending-id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records.iter().map(|(&id, record)| (id, record))
    }

    /// Exact k-nearest-neighbor search by L2 distance.
    ///
    /// Returns `min(k, len)` hits ascending by distance, ties broken by
    /// ascending insertion id. `k == 0` yields an empty result, not an
    /// error; a wrong-dimension query is [`IndexError::DimensionMismatch`].
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        self.check_dimension(query)?;
        let hits = self
            .accel
            .search(query, k)
            .into_iter()
            .filter_map(|(distance, id)| {
                self.records.get(&id).map(|record| SearchHit {
                    distance,
                    label: record.label.clone(),
                    source: record.source.clone(),
                })
            })
            .collect();
        Ok(hits)
    }

    /// The id set currently held by the scan structure.
    ///
    /// Always equal to the record table's id set; exposed so that coherence
    /// is externally checkable.
    pub fn indexed_ids(&self) -> BTreeSet<RecordId> {
        self.accel.ids().collect()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        Ok(())
    }

    fn ids_for_label<'a>(&'a self, label: &str) -> impl Iterator<Item = RecordId> + 'a {
        self.label_to_ids
            .get(label)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    fn unlink_label(&mut self, label: &str, id: RecordId) {
        if let Some(ids) = self.label_to_ids.get_mut(label) {
            ids.remove(&id);
            if ids.is_empty() {
                self.label_to_ids.remove(label);
            }
        }
    }
}
