use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ClassifierConfig;
use crate::dataset::{Dataset, SubsetDataset};
use crate::error::{ClassifierError, Result};
use crate::models::buffer::SampleBuffer;
use crate::models::classifier_trait::{Classifier, Ensemble};
use crate::output::OutputVector;
use crate::registry::Registry;

/// Resamples without a single labeled row are redrawn at most this often.
const MAX_DRAWS: usize = 32;

/// Bootstrap aggregating ensemble.
///
/// Every member is trained on its own resample (with replacement) of the
/// training data; outputs are the mean of the member outputs in sparse
/// class space.
///
/// `train` fits a fresh set of members built from the registry and swaps
/// them in only once all of them succeed, so a failed call leaves the
/// ensemble as it was. Members installed through
/// [`Ensemble::set_sub_model`] are replaced by the next `train`.
pub struct Bagger {
    members: Vec<Box<dyn Classifier>>,
    registry: Registry,
    config: ClassifierConfig,
    rng: StdRng,
    buffer: SampleBuffer,
}

/// Draw `dataset.sample_count()` rows with replacement, redrawing until the
/// resample holds at least one labeled row.
fn resample(rng: &mut StdRng, dataset: &dyn Dataset) -> Result<Vec<usize>> {
    let nsamples = dataset.sample_count();
    for _ in 0..MAX_DRAWS {
        let rows: Vec<usize> = (0..nsamples).map(|_| rng.gen_range(0..nsamples)).collect();
        if rows.iter().any(|&row| dataset.label_at(row) >= 0) {
            return Ok(rows);
        }
    }
    Err(ClassifierError::InvalidInput(format!(
        "no resample with a labeled row in {} draws",
        MAX_DRAWS
    )))
}

impl Bagger {
    /// Build `config.ensemble.members` members of kind `config.ensemble.member`.
    pub fn from_config(config: &ClassifierConfig, registry: &Registry) -> Result<Self> {
        let ensemble = &config.ensemble;
        if ensemble.members == 0 {
            return Err(ClassifierError::InvalidInput(
                "an ensemble needs at least one member".to_string(),
            ));
        }
        if ensemble.member == "bagger" {
            return Err(ClassifierError::InvalidInput(
                "bagger members cannot themselves be baggers".to_string(),
            ));
        }
        let buffer = SampleBuffer::new(&config.buffer, registry.dataset_constructor(&config.buffer)?);
        let mut bagger = Self {
            members: Vec::new(),
            registry: registry.clone(),
            config: config.clone(),
            rng: StdRng::seed_from_u64(ensemble.seed),
            buffer,
        };
        bagger.members = bagger.build_members()?;
        Ok(bagger)
    }

    fn build_members(&self) -> Result<Vec<Box<dyn Classifier>>> {
        (0..self.config.ensemble.members)
            .map(|_| self.registry.make_model(&self.config.ensemble.member, &self.config))
            .collect()
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }
}

impl Classifier for Bagger {
    fn name(&self) -> &str {
        "bagger"
    }

    fn add(&mut self, features: &[f32], label: i32) -> Result<()> {
        self.buffer.push("bagger", features, label)
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
        if self.members.is_empty() {
            return Err(ClassifierError::NotTrained);
        }
        let mut sum: Vec<f32> = Vec::new();
        let mut cost = 0.0;
        for member in &self.members {
            let (outputs, member_cost) = member.outputs(features)?;
            if outputs.len() > sum.len() {
                sum.resize(outputs.len(), 0.0);
            }
            for (s, &v) in sum.iter_mut().zip(outputs.as_slice()) {
                *s += v;
            }
            cost += member_cost;
        }
        let n = self.members.len() as f32;
        for s in sum.iter_mut() {
            *s /= n;
        }
        Ok((OutputVector::from(sum), cost / n))
    }

    fn train(&mut self, dataset: &dyn Dataset) -> Result<()> {
        let nsamples = dataset.sample_count();
        if nsamples == 0 || dataset.feature_count() == 0 {
            return Err(ClassifierError::InvalidInput(format!(
                "cannot train on {} samples with {} features",
                nsamples,
                dataset.feature_count()
            )));
        }
        if (0..nsamples).all(|i| dataset.label_at(i) < 0) {
            return Err(ClassifierError::InvalidInput(
                "dataset contains no labeled samples".to_string(),
            ));
        }
        let mut fitted = self.build_members()?;
        for (i, member) in fitted.iter_mut().enumerate() {
            let rows = resample(&mut self.rng, dataset)?;
            log::debug!("training bagger member {} on {} resampled rows", i, rows.len());
            member.train(&SubsetDataset::new(dataset, rows))?;
        }
        self.members = fitted;
        Ok(())
    }

    fn class_count(&self) -> Option<usize> {
        self.members.iter().filter_map(|m| m.class_count()).max()
    }

    fn feature_count(&self) -> Option<usize> {
        self.members.iter().find_map(|m| m.feature_count())
    }

    fn as_ensemble(&self) -> Option<&dyn Ensemble> {
        Some(self)
    }

    fn as_ensemble_mut(&mut self) -> Option<&mut dyn Ensemble> {
        Some(self)
    }
}

impl Ensemble for Bagger {
    fn sub_model_count(&self) -> usize {
        self.members.len()
    }

    fn sub_model(&self, index: usize) -> Result<&dyn Classifier> {
        self.members
            .get(index)
            .map(|m| &**m)
            .ok_or(ClassifierError::IndexOutOfRange {
                label: index as i64,
                domain: self.members.len(),
            })
    }

    fn set_sub_model(&mut self, index: usize, model: Box<dyn Classifier>) -> Result<()> {
        let domain = self.members.len();
        let slot = self
            .members
            .get_mut(index)
            .ok_or(ClassifierError::IndexOutOfRange {
                label: index as i64,
                domain,
            })?;
        *slot = model;
        Ok(())
    }
}
