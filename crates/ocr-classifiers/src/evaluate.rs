//! Confusion matrices and error statistics for trained classifiers.
//!
//! Rows and columns of a [`ConfusionMatrix`] are dense classes over the
//! labels seen during evaluation, true and predicted alike. Element `(t, p)`
//! counts samples of true class `t` that the classifier assigned to `p`.

use std::borrow::Cow;

use crate::dataset::Dataset;
use crate::error::{ClassifierError, Result};
use crate::math::Array2;
use crate::models::classifier_trait::Classifier;
use crate::remap::ClassMap;

/// Confusion counts over the labels that actually occurred.
///
/// The table is square over the dense classes of `classes`, so its size
/// depends on the number of distinct labels, not on their values.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionMatrix {
    classes: ClassMap,
    counts: Array2<usize>,
}

/// One off-diagonal cell of a confusion matrix, in label space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confusion {
    pub truth: i32,
    pub predicted: i32,
    pub count: usize,
}

impl ConfusionMatrix {
    /// An empty matrix over the given labels; negatives are ignored.
    pub fn with_labels(labels: &[i32]) -> Self {
        let classes = ClassMap::build(labels);
        let n = classes.dense_class_count();
        Self {
            classes,
            counts: Array2::zeros(n, n),
        }
    }

    /// Build from `(truth, predicted)` label pairs. Pairs holding a negative
    /// label are skipped.
    pub fn from_pairs(pairs: &[(i32, i32)]) -> Self {
        let labels: Vec<i32> = pairs
            .iter()
            .filter(|&&(t, p)| t >= 0 && p >= 0)
            .flat_map(|&(t, p)| [t, p])
            .collect();
        let mut matrix = Self::with_labels(&labels);
        for &(truth, predicted) in pairs {
            if let (Some(t), Some(p)) = (matrix.dense(truth), matrix.dense(predicted)) {
                matrix.counts[(t, p)] += 1;
            }
        }
        matrix
    }

    fn dense(&self, label: i32) -> Option<usize> {
        self.classes
            .dense_of(label)
            .filter(|&d| d >= 0)
            .map(|d| d as usize)
    }

    fn index(&self, label: i32) -> Result<usize> {
        self.dense(label).ok_or(ClassifierError::IndexOutOfRange {
            label: label as i64,
            domain: self.classes.sparse_class_count(),
        })
    }

    /// Number of distinct labels the matrix covers.
    pub fn n_classes(&self) -> usize {
        self.classes.dense_class_count()
    }

    /// Covered labels in ascending order; row and column `i` belong to
    /// `labels()[i]`.
    pub fn labels(&self) -> &[i32] {
        self.classes.sparse_table()
    }

    /// Count one sample. Both labels must be covered by the matrix.
    pub fn record(&mut self, truth: i32, predicted: i32) -> Result<()> {
        let t = self.index(truth)?;
        let p = self.index(predicted)?;
        self.counts[(t, p)] += 1;
        Ok(())
    }

    /// Count for a pair of labels; `0` for labels the matrix never saw.
    pub fn get(&self, truth: i32, predicted: i32) -> usize {
        match (self.dense(truth), self.dense(predicted)) {
            (Some(t), Some(p)) => self.counts[(t, p)],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.as_slice().iter().sum()
    }

    /// Sum of the diagonal.
    pub fn correct(&self) -> usize {
        (0..self.n_classes()).map(|c| self.counts[(c, c)]).sum()
    }

    /// Fraction of off-diagonal mass; `0.0` for an empty matrix.
    pub fn error_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        1.0 - self.correct() as f64 / total as f64
    }

    /// All nonzero off-diagonal cells, most frequent first.
    pub fn top_confusions(&self) -> Vec<Confusion> {
        let labels = self.labels();
        let n = self.n_classes();
        let mut list: Vec<Confusion> = (0..n)
            .flat_map(|t| (0..n).map(move |p| (t, p)))
            .filter(|&(t, p)| t != p && self.counts[(t, p)] > 0)
            .map(|(t, p)| Confusion {
                truth: labels[t],
                predicted: labels[p],
                count: self.counts[(t, p)],
            })
            .collect();
        list.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(a.truth.cmp(&b.truth))
                .then(a.predicted.cmp(&b.predicted))
        });
        list
    }
}

fn collect_pairs<'a>(
    classifier: &dyn Classifier,
    samples: impl Iterator<Item = (Cow<'a, [f32]>, i32)>,
) -> Result<Vec<(i32, i32)>> {
    let mut pairs = Vec::new();
    for (features, label) in samples {
        if label < 0 {
            continue;
        }
        let predicted = classifier.classify(&features)?;
        let predicted = i32::try_from(predicted).map_err(|_| ClassifierError::IndexOutOfRange {
            label: predicted as i64,
            domain: i32::MAX as usize,
        })?;
        pairs.push((label, predicted));
    }
    Ok(pairs)
}

/// Confusion matrix of `classifier` over every labeled sample in `dataset`.
pub fn confusion_matrix(classifier: &dyn Classifier, dataset: &dyn Dataset) -> Result<ConfusionMatrix> {
    let samples = (0..dataset.sample_count()).map(|i| (dataset.features_at(i), dataset.label_at(i)));
    let matrix = ConfusionMatrix::from_pairs(&collect_pairs(classifier, samples)?);
    log::debug!(
        "evaluated {} samples over {} classes, error rate {:.4}",
        matrix.total(),
        matrix.n_classes(),
        matrix.error_rate()
    );
    Ok(matrix)
}

/// Confusion matrix over feature rows and parallel labels.
pub fn confusion_matrix_from_rows(
    classifier: &dyn Classifier,
    features: &Array2<f32>,
    labels: &[i32],
) -> Result<ConfusionMatrix> {
    if features.nrows() != labels.len() {
        return Err(ClassifierError::InvalidInput(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }
    let samples = labels
        .iter()
        .enumerate()
        .map(|(row, &label)| (Cow::Borrowed(features.row_slice(row)), label));
    Ok(ConfusionMatrix::from_pairs(&collect_pairs(classifier, samples)?))
}

/// Error rate, `1 - diagonal / total`.
pub fn summarize(matrix: &ConfusionMatrix) -> f64 {
    matrix.error_rate()
}

pub fn top_confusions(matrix: &ConfusionMatrix) -> Vec<Confusion> {
    matrix.top_confusions()
}
