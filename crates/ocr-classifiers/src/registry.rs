//! Construct-by-name registry for classifiers and buffer datasets.
//!
//! Components are plain constructor functions keyed by name. A [`Context`]
//! bundles a registry with the active configuration and is passed
//! explicitly to whatever needs to build components.
use std::collections::BTreeMap;

use crate::config::ClassifierConfig;
use crate::dataset::{ExtDataset, RowDataset, RowDataset8};
use crate::error::{ClassifierError, Result};
use crate::models::bagger::Bagger;
use crate::models::classifier_trait::Classifier;
use crate::models::dense::DenseModel;
use crate::models::nearest_mean::NearestMean;

pub type DatasetConstructor = fn() -> Box<dyn ExtDataset>;

pub type ModelConstructor = fn(&ClassifierConfig, &Registry) -> Result<Box<dyn Classifier>>;

#[derive(Clone, Default)]
pub struct Registry {
    models: BTreeMap<String, ModelConstructor>,
    datasets: BTreeMap<String, DatasetConstructor>,
}

fn build_nearest_mean(config: &ClassifierConfig, registry: &Registry) -> Result<Box<dyn Classifier>> {
    let buffer = registry.dataset_constructor(&config.buffer)?;
    Ok(Box::new(DenseModel::new(
        NearestMean::default(),
        &config.buffer,
        buffer,
    )))
}

fn build_bagger(config: &ClassifierConfig, registry: &Registry) -> Result<Box<dyn Classifier>> {
    Ok(Box::new(Bagger::from_config(config, registry)?))
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the components shipped with this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_dataset("rowdataset", RowDataset::<f32>::boxed);
        registry.register_dataset("rowdataset8", RowDataset8::boxed);
        registry.register_model("nearest-mean", build_nearest_mean);
        registry.register_model("bagger", build_bagger);
        registry
    }

    pub fn register_model(&mut self, name: &str, constructor: ModelConstructor) {
        self.models.insert(name.to_string(), constructor);
    }

    pub fn register_dataset(&mut self, name: &str, constructor: DatasetConstructor) {
        self.datasets.insert(name.to_string(), constructor);
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn dataset_constructor(&self, name: &str) -> Result<DatasetConstructor> {
        self.datasets
            .get(name)
            .copied()
            .ok_or_else(|| ClassifierError::UnknownComponent(name.to_string()))
    }

    pub fn make_dataset(&self, name: &str) -> Result<Box<dyn ExtDataset>> {
        Ok(self.dataset_constructor(name)?())
    }

    pub fn make_model(&self, name: &str, config: &ClassifierConfig) -> Result<Box<dyn Classifier>> {
        let constructor = self
            .models
            .get(name)
            .ok_or_else(|| ClassifierError::UnknownComponent(name.to_string()))?;
        log::debug!("constructing {} (buffer {})", name, config.buffer);
        constructor(config, self)
    }
}

/// Registry plus configuration, threaded through construction calls.
#[derive(Clone)]
pub struct Context {
    pub registry: Registry,
    pub config: ClassifierConfig,
}

impl Context {
    pub fn new(registry: Registry, config: ClassifierConfig) -> Self {
        Self { registry, config }
    }

    /// Default components with the given configuration.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self::new(Registry::with_defaults(), config)
    }

    /// Build the configured model.
    pub fn make_model(&self) -> Result<Box<dyn Classifier>> {
        self.registry.make_model(&self.config.model, &self.config)
    }

    pub fn make_model_named(&self, name: &str) -> Result<Box<dyn Classifier>> {
        self.registry.make_model(name, &self.config)
    }

    /// Build the configured buffer dataset.
    pub fn make_buffer(&self) -> Result<Box<dyn ExtDataset>> {
        self.registry.make_dataset(&self.config.buffer)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::with_config(ClassifierConfig::default())
    }
}
