use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dataset::{labels, Dataset, TranslatedDataset};
use crate::error::{ClassifierError, Result};
use crate::models::buffer::SampleBuffer;
use crate::models::classifier_trait::Classifier;
use crate::output::OutputVector;
use crate::registry::DatasetConstructor;
use crate::remap::ClassMap;
use crate::translate::expand;

/// A classifier that only understands dense class indices `0..n`.
///
/// Wrapped in a [`DenseModel`], it can be trained and queried with sparse
/// labels.
pub trait DenseTrainer {
    fn name(&self) -> &str;

    /// Fit to a dataset whose labels are dense indices below
    /// `dataset.class_count()`, or `-1` for samples to ignore.
    fn train_dense(&mut self, dataset: &dyn Dataset) -> Result<()>;

    /// Dense class scores and the cost of the decision.
    fn outputs_dense(&self, features: &[f32]) -> Result<(Vec<f32>, f32)>;

    fn feature_count(&self) -> Option<usize> {
        None
    }

    fn prototype_count(&self) -> usize {
        0
    }

    fn prototype(&self, _index: usize, _variant: usize) -> Result<Vec<f32>> {
        Err(ClassifierError::unsupported(self.name(), "prototype"))
    }
}

/// Adapts a [`DenseTrainer`] to the sparse label space.
///
/// The class map is built from the labels of the first successful training
/// call and frozen afterwards. Later calls reuse it unchanged; samples whose
/// label the frozen map does not know are passed to the trainer as
/// unlabeled.
#[derive(Debug)]
pub struct DenseModel<T> {
    trainer: T,
    class_map: Option<ClassMap>,
    buffer: SampleBuffer,
}

#[derive(Serialize)]
struct StateRef<'a, T> {
    dense_of: &'a [i32],
    sparse_of: &'a [i32],
    trainer: &'a T,
}

#[derive(Deserialize)]
struct State<T> {
    dense_of: Vec<i32>,
    sparse_of: Vec<i32>,
    trainer: T,
}

fn count_unmapped(dataset: &dyn Dataset, map: &ClassMap) -> usize {
    labels(dataset)
        .into_iter()
        .filter(|&label| label >= 0 && map.dense_of(label).map_or(true, |d| d < 0))
        .count()
}

impl<T: DenseTrainer> DenseModel<T> {
    pub fn new(trainer: T, buffer_kind: &str, buffer: DatasetConstructor) -> Self {
        Self {
            trainer,
            class_map: None,
            buffer: SampleBuffer::new(buffer_kind, buffer),
        }
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    pub fn class_map(&self) -> Option<&ClassMap> {
        self.class_map.as_ref()
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    fn build_class_map(dataset: &dyn Dataset) -> Result<ClassMap> {
        let map = ClassMap::build(&labels(dataset));
        if map.is_empty() {
            return Err(ClassifierError::InvalidInput(
                "dataset contains no labeled samples".to_string(),
            ));
        }
        log::info!(
            "[mapped {} to {} classes]",
            map.sparse_class_count(),
            map.dense_class_count()
        );
        Ok(map)
    }

    /// Write the class map and trainer state as JSON.
    pub fn save_json<W: Write>(&self, writer: W) -> Result<()>
    where
        T: Serialize,
    {
        let map = self.class_map.as_ref().ok_or(ClassifierError::NotTrained)?;
        let state = StateRef {
            dense_of: map.dense_table(),
            sparse_of: map.sparse_table(),
            trainer: &self.trainer,
        };
        serde_json::to_writer(writer, &state)?;
        Ok(())
    }

    /// Restore a model written by [`save_json`](DenseModel::save_json). The
    /// restored class map is frozen.
    pub fn load_json<R: Read>(reader: R, buffer_kind: &str, buffer: DatasetConstructor) -> Result<Self>
    where
        T: DeserializeOwned,
    {
        let state: State<T> = serde_json::from_reader(reader)?;
        let map = ClassMap::from_parts(state.dense_of, state.sparse_of).ok_or_else(|| {
            ClassifierError::InvalidInput("stored class map is inconsistent".to_string())
        })?;
        let mut model = Self::new(state.trainer, buffer_kind, buffer);
        model.class_map = Some(map);
        Ok(model)
    }
}

impl<T: DenseTrainer> Classifier for DenseModel<T> {
    fn name(&self) -> &str {
        self.trainer.name()
    }

    fn add(&mut self, features: &[f32], label: i32) -> Result<()> {
        self.buffer.push(self.trainer.name(), features, label)
    }

    fn update_model(&mut self) -> Result<()> {
        let Some(data) = self.buffer.take() else {
            return Ok(());
        };
        if let Err(err) = self.train(data.as_dataset()) {
            self.buffer.restore(data);
            return Err(err);
        }
        Ok(())
    }

    fn outputs(&self, features: &[f32]) -> Result<(OutputVector, f32)> {
        let map = self.class_map.as_ref().ok_or(ClassifierError::NotTrained)?;
        let (dense, cost) = self.trainer.outputs_dense(features)?;
        Ok((expand(&dense, map)?, cost))
    }

    fn train(&mut self, dataset: &dyn Dataset) -> Result<()> {
        if dataset.sample_count() == 0 {
            return Err(ClassifierError::InvalidInput(
                "cannot train on an empty dataset".to_string(),
            ));
        }
        if dataset.feature_count() == 0 {
            return Err(ClassifierError::InvalidInput(
                "cannot train on samples without features".to_string(),
            ));
        }

        let fresh = match self.class_map {
            Some(_) => None,
            None => Some(Self::build_class_map(dataset)?),
        };
        let map = fresh
            .as_ref()
            .or(self.class_map.as_ref())
            .ok_or(ClassifierError::NotTrained)?;
        if fresh.is_none() {
            let unmapped = count_unmapped(dataset, map);
            if unmapped > 0 {
                log::warn!(
                    "{} of {} samples carry labels outside the frozen class map and are ignored",
                    unmapped,
                    dataset.sample_count()
                );
            }
        }

        self.trainer.train_dense(&TranslatedDataset::new(dataset, map))?;

        if fresh.is_some() {
            self.class_map = fresh;
        }
        Ok(())
    }

    fn feature_count(&self) -> Option<usize> {
        self.trainer.feature_count()
    }

    fn class_count(&self) -> Option<usize> {
        self.class_map.as_ref().map(ClassMap::sparse_class_count)
    }

    fn prototype_count(&self) -> usize {
        self.trainer.prototype_count()
    }

    fn prototype(&self, index: usize, variant: usize) -> Result<Vec<f32>> {
        self.trainer.prototype(index, variant)
    }
}
