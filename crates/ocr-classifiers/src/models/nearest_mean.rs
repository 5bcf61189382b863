use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{ClassifierError, Result};
use crate::models::dense::DenseTrainer;

/// Nearest class mean classifier over dense class indices.
///
/// Each class is represented by the mean of its training samples. Scores
/// are `exp(-(d_c - d_min))` normalized to sum to one, where `d_c` is the
/// mean squared distance to the class mean; the cost is `d_min`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NearestMean {
    nfeatures: usize,
    means: Vec<Vec<f32>>,
    counts: Vec<usize>,
}

impl NearestMean {
    pub fn class_sample_count(&self, class: usize) -> usize {
        self.counts.get(class).copied().unwrap_or(0)
    }

    fn distance(&self, mean: &[f32], features: &[f32]) -> f32 {
        let sum: f32 = mean
            .iter()
            .zip(features)
            .map(|(m, x)| (m - x) * (m - x))
            .sum();
        sum / self.nfeatures as f32
    }
}

impl DenseTrainer for NearestMean {
    fn name(&self) -> &str {
        "nearest-mean"
    }

    fn train_dense(&mut self, dataset: &dyn Dataset) -> Result<()> {
        let nclasses = dataset.class_count();
        let nfeatures = dataset.feature_count();
        let mut sums = vec![vec![0f64; nfeatures]; nclasses];
        let mut counts = vec![0usize; nclasses];

        for i in 0..dataset.sample_count() {
            let label = dataset.label_at(i);
            if label < 0 || label as usize >= nclasses {
                continue;
            }
            let class = label as usize;
            for (s, &x) in sums[class].iter_mut().zip(dataset.features_at(i).iter()) {
                *s += x as f64;
            }
            counts[class] += 1;
        }

        if counts.iter().all(|&n| n == 0) {
            return Err(ClassifierError::InvalidInput(
                "no samples with a known class".to_string(),
            ));
        }

        self.means = sums
            .into_iter()
            .zip(&counts)
            .map(|(sum, &n)| {
                if n == 0 {
                    Vec::new()
                } else {
                    sum.into_iter().map(|s| (s / n as f64) as f32).collect()
                }
            })
            .collect();
        self.counts = counts;
        self.nfeatures = nfeatures;
        log::debug!(
            "nearest-mean fitted {} classes over {} features",
            self.counts.iter().filter(|&&n| n > 0).count(),
            nfeatures
        );
        Ok(())
    }

    fn outputs_dense(&self, features: &[f32]) -> Result<(Vec<f32>, f32)> {
        if self.means.is_empty() {
            return Err(ClassifierError::NotTrained);
        }
        if features.len() != self.nfeatures {
            return Err(ClassifierError::InvalidInput(format!(
                "expected {} features, got {}",
                self.nfeatures,
                features.len()
            )));
        }

        let distances: Vec<Option<f32>> = self
            .means
            .iter()
            .map(|mean| (!mean.is_empty()).then(|| self.distance(mean, features)))
            .collect();
        let nearest = distances
            .iter()
            .flatten()
            .copied()
            .fold(f32::INFINITY, f32::min);

        let mut scores: Vec<f32> = distances
            .iter()
            .map(|d| d.map_or(0.0, |d| (-(d - nearest)).exp()))
            .collect();
        let total: f32 = scores.iter().sum();
        if total > 0.0 {
            for s in scores.iter_mut() {
                *s /= total;
            }
        }
        Ok((scores, nearest))
    }

    fn feature_count(&self) -> Option<usize> {
        (!self.means.is_empty()).then_some(self.nfeatures)
    }

    /// One slot per dense class, sampled or not.
    fn prototype_count(&self) -> usize {
        self.means.len()
    }

    /// Class means are the prototypes; only variant 0 exists. Classes that
    /// received no samples have no prototype.
    fn prototype(&self, index: usize, variant: usize) -> Result<Vec<f32>> {
        if variant != 0 {
            return Err(ClassifierError::InvalidInput(format!(
                "nearest-mean has no prototype variant {}",
                variant
            )));
        }
        let mean = self.means.get(index).ok_or(ClassifierError::IndexOutOfRange {
            label: index as i64,
            domain: self.means.len(),
        })?;
        if mean.is_empty() {
            return Err(ClassifierError::InvalidInput(format!(
                "class {} has no training samples",
                index
            )));
        }
        Ok(mean.clone())
    }
}
