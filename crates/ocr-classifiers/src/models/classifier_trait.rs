use crate::dataset::Dataset;
use crate::error::{ClassifierError, Result};
use crate::output::OutputVector;

/// Contract shared by every classifier in the crate.
///
/// Samples can be fed one at a time through [`add`](Classifier::add) and
/// flushed with [`update_model`](Classifier::update_model), or handed over
/// as a whole through [`train`](Classifier::train). Labels live in the
/// caller's (possibly sparse) label space; `-1` marks an unlabeled sample.
pub trait Classifier {
    /// Human readable name, used in logs and error messages.
    fn name(&self) -> &str {
        "classifier"
    }

    /// Buffer one labeled sample for the next model update.
    fn add(&mut self, features: &[f32], label: i32) -> Result<()>;

    /// Fit the model to everything buffered since the last update.
    fn update_model(&mut self) -> Result<()>;

    /// Score a sample. Returns per-class scores and a cost for the decision.
    fn outputs(&self, features: &[f32]) -> Result<(OutputVector, f32)>;

    /// Batch entry point. Models without a batch routine get one sample
    /// at a time through `add`.
    fn train(&mut self, dataset: &dyn Dataset) -> Result<()> {
        for i in 0..dataset.sample_count() {
            self.add(&dataset.features_at(i), dataset.label_at(i))?;
        }
        Ok(())
    }

    /// Label with the highest score.
    fn classify(&self, features: &[f32]) -> Result<usize> {
        let (outputs, _) = self.outputs(features)?;
        outputs.argmax().ok_or_else(|| {
            ClassifierError::InvalidInput(format!("{} produced no class scores", self.name()))
        })
    }

    fn feature_count(&self) -> Option<usize> {
        None
    }

    fn class_count(&self) -> Option<usize> {
        None
    }

    fn copy_from(&mut self, _other: &dyn Classifier) -> Result<()> {
        Err(ClassifierError::unsupported(self.name(), "copy_from"))
    }

    fn prototype_count(&self) -> usize {
        0
    }

    fn prototype(&self, _index: usize, _variant: usize) -> Result<Vec<f32>> {
        Err(ClassifierError::unsupported(self.name(), "prototype"))
    }

    fn as_ensemble(&self) -> Option<&dyn Ensemble> {
        None
    }

    fn as_ensemble_mut(&mut self) -> Option<&mut dyn Ensemble> {
        None
    }
}

/// Extra capabilities of models built from sub-models. Probe for it with
/// [`Classifier::as_ensemble`].
pub trait Ensemble {
    fn sub_model_count(&self) -> usize;

    fn sub_model(&self, index: usize) -> Result<&dyn Classifier>;

    fn set_sub_model(&mut self, index: usize, model: Box<dyn Classifier>) -> Result<()>;
}
