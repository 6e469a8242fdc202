//! Exact brute-force search structure backing the gallery.
//!
//! Vectors live in one contiguous buffer (structure-of-arrays) with a
//! parallel slot list of record ids; an id→slot map makes removal O(1) via
//! swap-remove. Search is a full scan: exact by construction, and faster
//! than graph or tree structures at the collection sizes the gallery
//! targets.
//!
//! Slot order is unstable across removals. Nothing here depends on it:
//! search results are ordered by `(distance, id)`, never by slot.

use std::collections::HashMap;

use crate::distance;

/// Flat exact-scan L2 index over fixed-dimension vectors.
#[derive(Debug, Clone)]
pub(crate) struct FlatL2 {
    /// Row-major vector storage, `dimension` floats per slot.
    vectors: Vec<f32>,
    /// Record id stored at each slot.
    ids: Vec<u64>,
    id_to_slot: HashMap<u64, usize>,
    dimension: usize,
}

impl FlatL2 {
    /// Create an empty index. The caller validates `dimension > 0`.
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            vectors: Vec::new(),
            ids: Vec::new(),
            id_to_slot: HashMap::new(),
            dimension,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.id_to_slot.contains_key(&id)
    }

    /// Ids currently present, in no particular order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    /// Insert a vector under `id`. The caller guarantees the id is absent
    /// and the vector has the configured dimension.
    pub(crate) fn insert(&mut self, id: u64, vector: &[f32]) {
        debug_assert_eq!(vector.len(), self.dimension);
        debug_assert!(!self.id_to_slot.contains_key(&id));
        let slot = self.ids.len();
        self.vectors.extend_from_slice(vector);
        self.ids.push(id);
        self.id_to_slot.insert(id, slot);
    }

    /// Remove the vector stored under `id`. Returns `false` if absent.
    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let slot = match self.id_to_slot.remove(&id) {
            Some(slot) => slot,
            None => return false,
        };
        let last = self.ids.len() - 1;
        self.ids.swap_remove(slot);
        if slot != last {
            let src = last * self.dimension;
            let dst = slot * self.dimension;
            self.vectors.copy_within(src..src + self.dimension, dst);
            self.id_to_slot.insert(self.ids[slot], slot);
        }
        self.vectors.truncate(last * self.dimension);
        true
    }

    /// Full-scan k-nearest-neighbor search.
    ///
    /// Returns up to `k` `(distance, id)` pairs, ascending by L2 distance
    /// with ties broken by ascending id.
    pub(crate) fn search(&self, query: &[f32], k: usize) -> Vec<(f32, u64)> {
        if k == 0 || self.ids.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<(f32, u64)> = self
            .ids
            .iter()
            .enumerate()
            .map(|(slot, &id)| (distance::l2_distance(query, self.slice(slot)), id))
            .collect();
        hits.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        hits.truncate(k);
        hits
    }

    fn slice(&self, slot: usize) -> &[f32] {
        let start = slot * self.dimension;
        &self.vectors[start..start + self.dimension]
    }
}
