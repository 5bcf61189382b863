//! Sparse to dense class remapping.
//!
//! OCR labels are usually character codes, so a dataset with a few dozen
//! classes can carry labels in the thousands. Dense-only classifiers want
//! `0..n` instead; a [`ClassMap`] records both directions of that
//! compaction.

use serde::{Deserialize, Serialize};

/// Label value marking a sample as unlabeled.
pub const UNLABELED: i32 = -1;

/// Bidirectional mapping between sparse labels and dense class indices.
///
/// `dense_of[label]` is the dense index of a sparse label, or `-1` when the
/// label never occurred. `sparse_of[dense]` is the sparse label of a dense
/// index. Dense indices follow ascending sparse label order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMap {
    dense_of: Vec<i32>,
    sparse_of: Vec<i32>,
}

/// One past the largest non-negative label; `0` when there is none.
fn domain_size(labels: &[i32]) -> usize {
    labels
        .iter()
        .copied()
        .filter(|&label| label >= 0)
        .max()
        .map_or(0, |m| m as usize + 1)
}

/// Frequency of every non-negative label, indexed by label.
fn histogram(labels: &[i32]) -> Vec<usize> {
    let mut hist = vec![0usize; domain_size(labels)];
    for &label in labels {
        if label < 0 {
            continue;
        }
        hist[label as usize] += 1;
    }
    hist
}

/// Number of distinct non-negative labels.
///
/// Also works on a `dense_of` table, where it counts the used dense classes.
pub fn count_distinct(labels: &[i32]) -> usize {
    histogram(labels).iter().filter(|&&n| n > 0).count()
}

impl ClassMap {
    /// Build a map from every label observed in `labels`, ignoring negatives.
    pub fn build(labels: &[i32]) -> ClassMap {
        let hist = histogram(labels);
        let mut dense_of = vec![UNLABELED; hist.len()];
        let mut sparse_of = Vec::with_capacity(hist.iter().filter(|&&n| n > 0).count());
        for (label, &count) in hist.iter().enumerate() {
            if count > 0 {
                dense_of[label] = sparse_of.len() as i32;
                sparse_of.push(label as i32);
            }
        }
        let map = ClassMap {
            dense_of,
            sparse_of,
        };
        debug_assert!(map.check());
        map
    }

    /// Restore a map from its two tables, verifying the invariants.
    pub fn from_parts(dense_of: Vec<i32>, sparse_of: Vec<i32>) -> Option<ClassMap> {
        let map = ClassMap {
            dense_of,
            sparse_of,
        };
        map.check().then_some(map)
    }

    /// Size of the sparse domain, `max(label) + 1`.
    pub fn sparse_class_count(&self) -> usize {
        self.dense_of.len()
    }

    /// Number of labels actually used.
    pub fn dense_class_count(&self) -> usize {
        self.sparse_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparse_of.is_empty()
    }

    /// Dense index of a sparse label; `None` outside the sparse domain,
    /// `Some(-1)` for an in-domain label that was never observed.
    pub fn dense_of(&self, label: i32) -> Option<i32> {
        if label < 0 {
            return None;
        }
        self.dense_of.get(label as usize).copied()
    }

    pub fn sparse_of(&self, dense: usize) -> Option<i32> {
        self.sparse_of.get(dense).copied()
    }

    pub fn dense_table(&self) -> &[i32] {
        &self.dense_of
    }

    pub fn sparse_table(&self) -> &[i32] {
        &self.sparse_of
    }

    /// Verify that both tables describe the same bijection.
    pub fn check(&self) -> bool {
        if self.sparse_of.len() > self.dense_of.len() {
            return false;
        }
        let max_sparse = self.sparse_of.iter().copied().max().map_or(0, |m| m as i64 + 1);
        if !self.sparse_of.is_empty() && max_sparse != self.dense_of.len() as i64 {
            return false;
        }
        let forward = self.sparse_of.iter().enumerate().all(|(dense, &sparse)| {
            sparse >= 0 && self.dense_of.get(sparse as usize) == Some(&(dense as i32))
        });
        let backward = self.dense_of.iter().enumerate().all(|(sparse, &dense)| {
            dense == UNLABELED || self.sparse_of.get(dense as usize) == Some(&(sparse as i32))
        });
        forward && backward
    }
}
