//! Dataset contract and the in-memory datasets used for training.
//!
//! [`Dataset`] is the read-only view every classifier trains from.
//! [`RowDataset`] is the growable buffer behind incremental `add` calls,
//! while [`TranslatedDataset`] and [`SubsetDataset`] are views that rewrite
//! labels or select rows without copying features.
use std::borrow::Cow;

use crate::error::{ClassifierError, Result};
use crate::math::Array2;
use crate::remap::{ClassMap, UNLABELED};

pub trait Dataset {
    fn sample_count(&self) -> usize;

    fn feature_count(&self) -> usize;

    /// One past the largest label in the dataset.
    fn class_count(&self) -> usize;

    fn features_at(&self, index: usize) -> Cow<'_, [f32]>;

    fn label_at(&self, index: usize) -> i32;

    fn id_at(&self, index: usize) -> i32;

    fn name(&self) -> &str {
        "dataset"
    }
}

/// A dataset that can grow one sample at a time.
pub trait ExtDataset: Dataset {
    fn add(&mut self, features: &[f32], label: i32) -> Result<()>;

    fn add_with_id(&mut self, features: &[f32], label: i32, id: i32) -> Result<()>;

    fn as_dataset(&self) -> &dyn Dataset;
}

/// Collect every label of a dataset, in sample order.
pub fn labels(dataset: &dyn Dataset) -> Vec<i32> {
    (0..dataset.sample_count())
        .map(|i| dataset.label_at(i))
        .collect()
}

/// Storage type of a row dataset cell.
pub trait FeatureCell: Copy {
    fn encode(value: f32) -> Self;
    fn decode(self) -> f32;
}

impl FeatureCell for f32 {
    fn encode(value: f32) -> Self {
        value
    }

    fn decode(self) -> f32 {
        self
    }
}

/// Byte cells hold pixel-like features; values are rounded and clamped to
/// `0..=255`.
impl FeatureCell for u8 {
    fn encode(value: f32) -> Self {
        if value.is_nan() {
            0
        } else {
            value.round().clamp(0.0, 255.0) as u8
        }
    }

    fn decode(self) -> f32 {
        self as f32
    }
}

/// Row-major, growable dataset of labeled feature vectors.
#[derive(Clone, Debug)]
pub struct RowDataset<T> {
    x: Array2<T>,
    y: Vec<i32>,
    ids: Vec<i32>,
    nclasses: usize,
}

pub type RowDataset8 = RowDataset<u8>;

impl<T: FeatureCell> RowDataset<T> {
    pub fn new() -> Self {
        Self {
            x: Array2::empty(),
            y: Vec::new(),
            ids: Vec::new(),
            nclasses: 0,
        }
    }

    /// Build a dataset from a feature matrix and one label per row.
    pub fn from_rows(x: &Array2<f32>, y: &[i32]) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(ClassifierError::InvalidInput(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        let mut ds = Self::new();
        for (row, &label) in y.iter().enumerate() {
            ds.add(x.row_slice(row), label)?;
        }
        Ok(ds)
    }

    pub fn boxed() -> Box<dyn ExtDataset>
    where
        T: 'static,
    {
        Box::new(Self::new())
    }
}

impl<T: FeatureCell> Default for RowDataset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FeatureCell> Dataset for RowDataset<T> {
    fn sample_count(&self) -> usize {
        self.x.nrows()
    }

    fn feature_count(&self) -> usize {
        self.x.ncols()
    }

    fn class_count(&self) -> usize {
        self.nclasses
    }

    fn features_at(&self, index: usize) -> Cow<'_, [f32]> {
        Cow::Owned(self.x.row_slice(index).iter().map(|&v| v.decode()).collect())
    }

    fn label_at(&self, index: usize) -> i32 {
        self.y[index]
    }

    fn id_at(&self, index: usize) -> i32 {
        self.ids[index]
    }

    fn name(&self) -> &str {
        "rowdataset"
    }
}

impl<T: FeatureCell> ExtDataset for RowDataset<T> {
    fn add(&mut self, features: &[f32], label: i32) -> Result<()> {
        let id = self.y.len() as i32;
        self.add_with_id(features, label, id)
    }

    fn add_with_id(&mut self, features: &[f32], label: i32, id: i32) -> Result<()> {
        let row: Vec<T> = features.iter().map(|&v| T::encode(v)).collect();
        self.x.push_row(&row)?;
        self.y.push(label);
        self.ids.push(id);
        if label >= 0 {
            self.nclasses = self.nclasses.max(label as usize + 1);
        }
        Ok(())
    }

    fn as_dataset(&self) -> &dyn Dataset {
        self
    }
}

/// Dataset view whose labels are translated into dense class indices.
///
/// Features and ids pass through untouched. Unlabeled samples, and labels
/// outside the map's sparse domain, read as [`UNLABELED`].
pub struct TranslatedDataset<'a> {
    inner: &'a dyn Dataset,
    map: &'a ClassMap,
}

impl<'a> TranslatedDataset<'a> {
    pub fn new(inner: &'a dyn Dataset, map: &'a ClassMap) -> Self {
        Self { inner, map }
    }
}

impl Dataset for TranslatedDataset<'_> {
    fn sample_count(&self) -> usize {
        self.inner.sample_count()
    }

    fn feature_count(&self) -> usize {
        self.inner.feature_count()
    }

    fn class_count(&self) -> usize {
        self.map.dense_class_count()
    }

    fn features_at(&self, index: usize) -> Cow<'_, [f32]> {
        self.inner.features_at(index)
    }

    fn label_at(&self, index: usize) -> i32 {
        self.map
            .dense_of(self.inner.label_at(index))
            .unwrap_or(UNLABELED)
    }

    fn id_at(&self, index: usize) -> i32 {
        self.inner.id_at(index)
    }

    fn name(&self) -> &str {
        "mappeddataset"
    }
}

/// Dataset view over a selection of rows; indices may repeat.
pub struct SubsetDataset<'a> {
    inner: &'a dyn Dataset,
    rows: Vec<usize>,
}

impl<'a> SubsetDataset<'a> {
    pub fn new(inner: &'a dyn Dataset, rows: Vec<usize>) -> Self {
        Self { inner, rows }
    }
}

impl Dataset for SubsetDataset<'_> {
    fn sample_count(&self) -> usize {
        self.rows.len()
    }

    fn feature_count(&self) -> usize {
        self.inner.feature_count()
    }

    fn class_count(&self) -> usize {
        self.inner.class_count()
    }

    fn features_at(&self, index: usize) -> Cow<'_, [f32]> {
        self.inner.features_at(self.rows[index])
    }

    fn label_at(&self, index: usize) -> i32 {
        self.inner.label_at(self.rows[index])
    }

    fn id_at(&self, index: usize) -> i32 {
        self.inner.id_at(self.rows[index])
    }

    fn name(&self) -> &str {
        "subsetdataset"
    }
}
