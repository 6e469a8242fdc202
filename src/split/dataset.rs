//! Item access over one side of a stratified split.
//!
//! A [`SplitDataset`] pairs a labeled item collection with a
//! [`StratifiedSplit`](super::StratifiedSplit) and exposes exactly one
//! subset of it. Item decoding stays behind the [`ItemLoader`] seam: the
//! dataset knows paths and labels, a loader turns a path into whatever the
//! consumer trains on.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::SplitError;
use super::{SplitConfig, StratifiedSplit, Subset};

/// File extensions recognized by [`SplitDataset::from_directory`],
/// case-insensitive.
const ITEM_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// Turns an item path into a loaded item.
///
/// Decoding and any tensor conversion live behind this trait, outside the
/// crate; a loader must be deterministic for a given path and
/// configuration.
pub trait ItemLoader {
    type Item;

    fn load(&self, path: &Path) -> Result<Self::Item, SplitError>;
}

/// Loader that returns a file's raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawLoader;

impl ItemLoader for RawLoader {
    type Item = Vec<u8>;

    fn load(&self, path: &Path) -> Result<Vec<u8>, SplitError> {
        Ok(fs::read(path)?)
    }
}

/// A loaded item paired with its dense class index and source path.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledItem<T> {
    pub item: T,
    /// Position of the item's label in [`SplitDataset::classes`]; stable for
    /// the life of the dataset.
    pub class_index: usize,
    pub source: PathBuf,
}

/// One subset (train or test) of a stratified labeled item collection.
///
/// Immutable after construction. Labels are mapped once to dense integer
/// ids, taken from the sorted set of distinct labels that survived the
/// eligibility filter; `get` reports labels through that mapping.
#[derive(Debug)]
pub struct SplitDataset<L> {
    paths: Vec<PathBuf>,
    labels: Vec<String>,
    classes: Vec<String>,
    class_to_index: BTreeMap<String, usize>,
    split: StratifiedSplit,
    subset: Subset,
    loader: L,
}

impl<L: ItemLoader> SplitDataset<L> {
    /// Build a dataset from labeled items.
    ///
    /// Classes with fewer than `min_class_size + min_class_size *
    /// test_fraction` items are dropped entirely (their items appear in
    /// neither subset) so every kept class can fund both the minimum train
    /// set and a non-empty test set. The surviving items are then split by
    /// [`StratifiedSplit::new`].
    pub fn from_items(
        items: Vec<(PathBuf, String)>,
        subset: Subset,
        config: &SplitConfig,
        loader: L,
    ) -> Result<Self, SplitError> {
        config.validate()?;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, label) in &items {
            *counts.entry(label.as_str()).or_default() += 1;
        }
        let threshold = config.eligibility_threshold();
        let keep: Vec<bool> = items
            .iter()
            .map(|(_, label)| counts[label.as_str()] as f64 >= threshold)
            .collect();

        let total = items.len();
        let mut paths = Vec::new();
        let mut labels = Vec::new();
        for ((path, label), keep) in items.into_iter().zip(keep) {
            if keep {
                paths.push(path);
                labels.push(label);
            }
        }
        if paths.len() < total {
            debug!(
                dropped = total - paths.len(),
                "excluded items of undersized classes"
            );
        }

        let split = StratifiedSplit::new(&labels, config)?;

        let mut classes = labels.clone();
        classes.sort();
        classes.dedup();
        let class_to_index = classes
            .iter()
            .enumerate()
            .map(|(index, class)| (class.clone(), index))
            .collect();

        Ok(Self {
            paths,
            labels,
            classes,
            class_to_index,
            split,
            subset,
            loader,
        })
    }

    /// Build a dataset by walking a directory tree.
    ///
    /// Items are files with a recognized extension (`png`, `jpg`, `jpeg`,
    /// `tiff`, `bmp`, `gif`), each labeled by the name of its containing
    /// directory. Files are sorted by path before splitting so the result
    /// does not depend on filesystem iteration order.
    pub fn from_directory(
        root: impl AsRef<Path>,
        subset: Subset,
        config: &SplitConfig,
        loader: L,
    ) -> Result<Self, SplitError> {
        let mut items = Vec::new();
        collect_items(root.as_ref(), &mut items)?;
        items.sort();
        debug!(found = items.len(), root = %root.as_ref().display(), "scanned item directory");
        Self::from_items(items, subset, config, loader)
    }

    /// Number of items in the active subset.
    pub fn len(&self) -> usize {
        self.split.subset(self.subset).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Which side of the split this dataset exposes.
    pub fn subset(&self) -> Subset {
        self.subset
    }

    /// Load the `index`-th item of the active subset.
    pub fn get(&self, index: usize) -> Result<LabeledItem<L::Item>, SplitError> {
        let indices = self.split.subset(self.subset);
        let slot = *indices.get(index).ok_or(SplitError::OutOfBounds {
            index,
            len: indices.len(),
        })?;
        let path = &self.paths[slot];
        let item = self.loader.load(path)?;
        Ok(LabeledItem {
            item,
            class_index: self.class_to_index[&self.labels[slot]],
            source: path.clone(),
        })
    }

    /// Distinct class labels, sorted; positions define the dense class
    /// indices reported by [`get`](Self::get).
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Dense index for a class label, if the class survived the filter.
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.class_to_index.get(label).copied()
    }

    /// The underlying assignment, for inspection or persistence.
    pub fn split(&self) -> &StratifiedSplit {
        &self.split
    }
}

fn collect_items(dir: &Path, items: &mut Vec<(PathBuf, String)>) -> Result<(), SplitError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_items(&path, items)?;
        } else if has_item_extension(&path) {
            if let Some(label) = parent_dir_name(&path) {
                items.push((path, label));
            }
        }
    }
    Ok(())
}

fn has_item_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ITEM_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn parent_dir_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map(str::to_owned)
}
