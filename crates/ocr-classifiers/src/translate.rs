//! Moving labels and score vectors between sparse and dense class spaces.

use crate::error::{ClassifierError, Result};
use crate::output::OutputVector;
use crate::remap::ClassMap;

fn lookup(map: &ClassMap, label: i32) -> Result<i32> {
    map.dense_of(label)
        .ok_or(ClassifierError::IndexOutOfRange {
            label: label as i64,
            domain: map.sparse_class_count(),
        })
}

/// Replace every label by its dense index.
///
/// Labels that were in the domain but never observed become `-1`. Any label
/// outside the domain, negatives included, is an error.
pub fn translate_strict(labels: &[i32], map: &ClassMap) -> Result<Vec<i32>> {
    labels.iter().map(|&label| lookup(map, label)).collect()
}

/// Like [`translate_strict`], but negative labels (unlabeled samples) are
/// copied through unchanged.
pub fn translate_passthrough(labels: &[i32], map: &ClassMap) -> Result<Vec<i32>> {
    labels
        .iter()
        .map(|&label| if label < 0 { Ok(label) } else { lookup(map, label) })
        .collect()
}

/// Spread a dense score vector over the sparse class space.
///
/// The result has `max(sparse_of) + 1` entries; classes with no dense
/// counterpart read as zero.
pub fn expand(dense_scores: &[f32], map: &ClassMap) -> Result<OutputVector> {
    if dense_scores.len() > map.dense_class_count() {
        return Err(ClassifierError::IndexOutOfRange {
            label: dense_scores.len() as i64 - 1,
            domain: map.dense_class_count(),
        });
    }
    let mut sparse = OutputVector::zeros(map.sparse_class_count());
    for (&target, &score) in map.sparse_table().iter().zip(dense_scores) {
        sparse.set(target as usize, score);
    }
    Ok(sparse)
}
