//! Stratified train/test splitting for labeled item collections.
//!
//! [`StratifiedSplit`] deterministically partitions item indices into
//! disjoint train and test sets, class by class, so both subsets preserve
//! class representation. [`SplitDataset`] layers item access on top of one
//! subset, with a stable dense integer encoding of class labels.
//!
//! # Per-class split shape
//!
//! For a class with `n` items and configuration `{test_fraction, min_class_size}`:
//!
//! 1. `n < min_class_size` fails with [`SplitError::InsufficientSamples`].
//! 2. `n_test = floor(n * test_fraction)`, `n_train = n - n_test`.
//! 3. `n_train` is clamped up to [`MIN_TRAIN_PER_CLASS`]; downstream
//!    contrastive samplers need that many anchor examples per class, and the
//!    floor takes priority over the requested fraction.
//! 4. A resulting `n_test` of zero fails with `InsufficientSamples`: every
//!    surviving class must land in both subsets, never silently lose its
//!    test set.
//!
//! # Determinism
//!
//! The assignment is a pure function of `(labels, config)`: classes are
//! visited in sorted label order and each class's indices are shuffled by a
//! single `StdRng` seeded from `config.seed`, so identical inputs reproduce
//! the split bit for bit.

mod dataset;
mod error;

pub use dataset::{ItemLoader, LabeledItem, RawLoader, SplitDataset};
pub use error::SplitError;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum number of train items per surviving class.
pub const MIN_TRAIN_PER_CLASS: usize = 3;

/// Configuration for a stratified split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of each class routed to the test subset, in `[0, 1]`.
    pub test_fraction: f64,
    /// Seed for the per-class permutation.
    pub seed: u64,
    /// Minimum class size (`k`): smaller classes fail construction, and the
    /// collection constructors drop classes below
    /// `k + k * test_fraction` before splitting.
    pub min_class_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            min_class_size: 5,
        }
    }
}

impl SplitConfig {
    /// Validate field ranges. Called by every split constructor.
    pub fn validate(&self) -> Result<(), SplitError> {
        if !self.test_fraction.is_finite() || !(0.0..=1.0).contains(&self.test_fraction) {
            return Err(SplitError::InvalidConfig(format!(
                "test_fraction must be in [0, 1], got {}",
                self.test_fraction
            )));
        }
        if self.min_class_size == 0 {
            return Err(SplitError::InvalidConfig(
                "min_class_size must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Minimum class count for the eligibility filter used by the
    /// collection constructors.
    pub(crate) fn eligibility_threshold(&self) -> f64 {
        self.min_class_size as f64 + self.min_class_size as f64 * self.test_fraction
    }
}

/// Which side of a split a dataset exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subset {
    Train,
    Test,
}

/// A deterministic disjoint train/test assignment of item indices.
///
/// Immutable once constructed. Indices within each subset are grouped by
/// class in sorted label order; within a class they follow the seeded draw,
/// not any global ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl StratifiedSplit {
    /// Split `labels` (one per item, by index) into train and test sets.
    ///
    /// This is the pure assignment: no eligibility filtering happens here,
    /// so a class smaller than the configured minimum fails with
    /// [`SplitError::InsufficientSamples`]. Collection-level constructors
    /// ([`SplitDataset::from_items`], [`SplitDataset::from_directory`])
    /// filter undersized classes out first.
    pub fn new(labels: &[String], config: &SplitConfig) -> Result<Self, SplitError> {
        config.validate()?;

        let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, label) in labels.iter().enumerate() {
            by_class.entry(label.as_str()).or_default().push(index);
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut train = Vec::new();
        let mut test = Vec::new();

        for (label, mut indices) in by_class {
            let n = indices.len();
            if n < config.min_class_size {
                return Err(SplitError::InsufficientSamples {
                    label: label.to_owned(),
                    count: n,
                });
            }

            let mut n_test = (n as f64 * config.test_fraction).floor() as usize;
            let mut n_train = n - n_test;
            if n_train < MIN_TRAIN_PER_CLASS {
                n_train = MIN_TRAIN_PER_CLASS;
                n_test = n.saturating_sub(n_train);
            }
            // Every surviving class must land in both subsets.
            if n_test == 0 {
                return Err(SplitError::InsufficientSamples {
                    label: label.to_owned(),
                    count: n,
                });
            }

            indices.shuffle(&mut rng);
            train.extend_from_slice(&indices[..n_train]);
            test.extend_from_slice(&indices[n_train..]);
        }

        debug!(
            train = train.len(),
            test = test.len(),
            "constructed stratified split"
        );
        Ok(Self { train, test })
    }

    pub fn train_indices(&self) -> &[usize] {
        &self.train
    }

    pub fn test_indices(&self) -> &[usize] {
        &self.test
    }

    /// The index list for one side of the split.
    pub fn subset(&self, subset: Subset) -> &[usize] {
        match subset {
            Subset::Train => &self.train,
            Subset::Test => &self.test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(groups: &[(&str, usize)]) -> Vec<String> {
        groups.iter()
            .flat_map(|&(label, n)| std::iter::repeat(label.to_owned()).take(n))
            .collect()
    }

    #[test]
    fn default_config_matches_original_system() {
        let config = SplitConfig::default();
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.min_class_size, 5);
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let config = SplitConfig {
            test_fraction: 1.5,
            ..SplitConfig::default()
        };
        assert!(matches!(
            StratifiedSplit::new(&labels(&[("a", 10)]), &config),
            Err(SplitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_min_class_size() {
        let config = SplitConfig {
            min_class_size: 0,
            ..SplitConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SplitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn undersized_class_fails() {
        let err = StratifiedSplit::new(&labels(&[("a", 4)]), &SplitConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SplitError::InsufficientSamples {
                label: "a".to_owned(),
                count: 4
            }
        );
    }

    #[test]
    fn zero_test_fraction_cannot_produce_a_test_set() {
        let config = SplitConfig {
            test_fraction: 0.0,
            ..SplitConfig::default()
        };
        assert!(matches!(
            StratifiedSplit::new(&labels(&[("a", 10)]), &config),
            Err(SplitError::InsufficientSamples { .. })
        ));
    }

    #[test]
    fn train_floor_takes_priority_over_fraction() {
        let config = SplitConfig {
            test_fraction: 0.8,
            ..SplitConfig::default()
        };
        let split = StratifiedSplit::new(&labels(&[("a", 10)]), &config).unwrap();
        assert_eq!(split.train_indices().len(), MIN_TRAIN_PER_CLASS);
        assert_eq!(split.test_indices().len(), 7);
    }

    #[test]
    fn clamp_that_empties_the_test_set_fails() {
        // 3 items, 10% test: the fraction gives n_test = 0 and the floor
        // keeps all 3 in train.
        let config = SplitConfig {
            test_fraction: 0.1,
            min_class_size: 3,
            ..SplitConfig::default()
        };
        assert!(matches!(
            StratifiedSplit::new(&labels(&[("a", 3)]), &config),
            Err(SplitError::InsufficientSamples { .. })
        ));
    }
}
