//! Integration tests for the component registry, contexts and configuration.

use ocr_classifiers::config::{ClassifierConfig, DEFAULT_BUFFER, DEFAULT_MODEL};
use ocr_classifiers::dataset::{ExtDataset, RowDataset};
use ocr_classifiers::error::{ClassifierError, Result};
use ocr_classifiers::models::nearest_mean::NearestMean;
use ocr_classifiers::{Classifier, Context, Dataset, DenseModel, OutputVector, Registry};

fn clusters() -> RowDataset<f32> {
    let mut ds = RowDataset::new();
    for i in 0..10 {
        let jitter = i as f32 * 0.1;
        ds.add(&[jitter, 0.0], 300).unwrap();
        ds.add(&[50.0 + jitter, 50.0], 7).unwrap();
    }
    ds
}

// ---------------------------------------------------------------------------
// ClassifierConfig
// ---------------------------------------------------------------------------

#[test]
fn config_defaults() {
    let cfg = ClassifierConfig::default();
    assert_eq!(cfg.buffer, DEFAULT_BUFFER);
    assert_eq!(cfg.model, DEFAULT_MODEL);
    assert!(cfg.ensemble.members > 0);
}

#[test]
fn config_from_key_value_pairs() {
    let cfg: ClassifierConfig = "model=bagger, members=3,seed=11,cds=rowdataset".parse().unwrap();
    assert_eq!(cfg.model, "bagger");
    assert_eq!(cfg.buffer, "rowdataset");
    assert_eq!(cfg.ensemble.members, 3);
    assert_eq!(cfg.ensemble.seed, 11);
}

#[test]
fn config_rejects_unknown_keys_and_bad_values() {
    assert!("colour=blue".parse::<ClassifierConfig>().is_err());
    assert!("members=many".parse::<ClassifierConfig>().is_err());
    assert!("model".parse::<ClassifierConfig>().is_err());
}

#[test]
fn config_round_trips_json_with_missing_fields() {
    let cfg = ClassifierConfig::new("bagger", "rowdataset");
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(json.contains("buffer"));
    let back: ClassifierConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);

    let partial: ClassifierConfig = serde_json::from_str(r#"{"model":"bagger"}"#).unwrap();
    assert_eq!(partial.buffer, DEFAULT_BUFFER);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn default_registry_lists_builtin_components() {
    let registry = Registry::with_defaults();
    let models: Vec<&str> = registry.model_names().collect();
    assert_eq!(models, vec!["bagger", "nearest-mean"]);
    let datasets: Vec<&str> = registry.dataset_names().collect();
    assert_eq!(datasets, vec!["rowdataset", "rowdataset8"]);
}

#[test]
fn unknown_names_are_reported() {
    let registry = Registry::with_defaults();
    let cfg = ClassifierConfig::default();
    assert!(matches!(
        registry.make_model("mlp", &cfg),
        Err(ClassifierError::UnknownComponent(name)) if name == "mlp"
    ));
    assert!(registry.make_dataset("rowdataset16").is_err());

    let cfg = ClassifierConfig::new("nearest-mean", "nosuchbuffer");
    assert!(Context::with_config(cfg).make_model().is_err());
}

#[test]
fn empty_registry_builds_nothing() {
    let registry = Registry::new();
    assert_eq!(registry.model_names().count(), 0);
    assert!(registry.make_model("nearest-mean", &ClassifierConfig::default()).is_err());
}

#[test]
fn context_builds_configured_buffer() {
    let ctx = Context::default();
    let buffer = ctx.make_buffer().unwrap();
    assert_eq!(buffer.sample_count(), 0);
}

#[test]
fn context_model_trains_incrementally() {
    let ctx = Context::default();
    let mut model = ctx.make_model().unwrap();
    assert_eq!(model.name(), "nearest-mean");
    let ds = clusters();
    model.train(&ds).unwrap();
    assert_eq!(model.class_count(), Some(301));
    assert_eq!(model.classify(&[0.3, 0.1]).unwrap(), 300);
    assert_eq!(model.classify(&[49.0, 51.0]).unwrap(), 7);
}

#[test]
fn incremental_adds_go_through_configured_buffer() {
    let ctx = Context::default();
    let mut model = ctx.make_model().unwrap();
    model.add(&[0.0, 0.0], 12).unwrap();
    model.add(&[200.0, 200.0], 40).unwrap();
    assert!(matches!(
        model.outputs(&[0.0, 0.0]),
        Err(ClassifierError::NotTrained)
    ));
    model.update_model().unwrap();
    assert_eq!(model.classify(&[10.0, 5.0]).unwrap(), 12);
}

// ---------------------------------------------------------------------------
// Ensembles
// ---------------------------------------------------------------------------

#[test]
fn bagger_exposes_its_members() {
    let cfg: ClassifierConfig = "model=bagger,members=4,seed=3,buffer=rowdataset".parse().unwrap();
    let ctx = Context::with_config(cfg);
    let mut model = ctx.make_model().unwrap();
    assert_eq!(model.name(), "bagger");
    model.train(&clusters()).unwrap();

    let ensemble = model.as_ensemble().unwrap();
    assert_eq!(ensemble.sub_model_count(), 4);
    assert_eq!(ensemble.sub_model(0).unwrap().name(), "nearest-mean");
    assert!(ensemble.sub_model(4).is_err());

    assert_eq!(model.classify(&[0.5, 0.0]).unwrap(), 300);
    assert_eq!(model.classify(&[50.0, 49.0]).unwrap(), 7);
    let (outputs, _) = model.outputs(&[0.5, 0.0]).unwrap();
    assert!(outputs.get(300) > outputs.get(7));
}

#[test]
fn bagger_members_can_be_replaced() {
    let cfg: ClassifierConfig = "model=bagger,members=2".parse().unwrap();
    let ctx = Context::with_config(cfg);
    let mut model = ctx.make_model().unwrap();
    let replacement = ctx.make_model_named("nearest-mean").unwrap();
    let ensemble = model.as_ensemble_mut().unwrap();
    ensemble.set_sub_model(1, replacement).unwrap();
    let spare = ctx.make_model_named("nearest-mean").unwrap();
    assert!(ensemble.set_sub_model(2, spare).is_err());
}

#[test]
fn bagger_rejects_degenerate_configurations() {
    let ctx = Context::with_config("model=bagger,members=0".parse().unwrap());
    assert!(ctx.make_model().is_err());
    let ctx = Context::with_config("model=bagger,member=bagger".parse().unwrap());
    assert!(ctx.make_model().is_err());
}

#[test]
fn bagger_trains_every_member_on_sparsely_labeled_data() {
    let mut ds = RowDataset::<f32>::new();
    ds.add(&[1.0, 1.0], 42).unwrap();
    for i in 0..9 {
        ds.add(&[i as f32, 0.0], -1).unwrap();
    }
    let ctx = Context::with_config("model=bagger,members=5,seed=0,buffer=rowdataset".parse().unwrap());
    let mut model = ctx.make_model().unwrap();
    model.train(&ds).unwrap();

    let ensemble = model.as_ensemble().unwrap();
    for i in 0..ensemble.sub_model_count() {
        assert_eq!(ensemble.sub_model(i).unwrap().class_count(), Some(43));
    }
    assert_eq!(model.classify(&[1.0, 1.0]).unwrap(), 42);
}

/// Nearest-mean model that refuses any dataset containing label 13.
struct RejectsThirteen(DenseModel<NearestMean>);

impl Classifier for RejectsThirteen {
    fn name(&self) -> &str {
        "rejects-thirteen"
    }

    fn add(&mut self, features: &[f32], label: i32) -> Result<()> {
        self.0.add(features, label)
    }

    fn update_model(&mut self) -> Result<()> {
        self.0.update_model()
    }

    fn outputs(&self, features: &[f32]) -> Result<(OutputVector, f32)> {
        self.0.outputs(features)
    }

    fn train(&mut self, dataset: &dyn Dataset) -> Result<()> {
        if (0..dataset.sample_count()).any(|i| dataset.label_at(i) == 13) {
            return Err(ClassifierError::InvalidInput("label 13 is not accepted".to_string()));
        }
        self.0.train(dataset)
    }

    fn class_count(&self) -> Option<usize> {
        self.0.class_count()
    }
}

fn build_rejects_thirteen(_config: &ClassifierConfig, _registry: &Registry) -> Result<Box<dyn Classifier>> {
    Ok(Box::new(RejectsThirteen(DenseModel::new(
        NearestMean::default(),
        "rowdataset",
        RowDataset::<f32>::boxed,
    ))))
}

#[test]
fn failed_bagger_training_leaves_members_untouched() {
    let mut registry = Registry::with_defaults();
    registry.register_model("rejects-thirteen", build_rejects_thirteen);
    let cfg: ClassifierConfig = "model=bagger,member=rejects-thirteen,members=3,seed=5".parse().unwrap();
    let ctx = Context::new(registry, cfg);

    let mut untrained = ctx.make_model().unwrap();
    let mut poisoned = RowDataset::<f32>::new();
    poisoned.add(&[0.0, 0.0], 2).unwrap();
    for i in 0..9 {
        poisoned.add(&[i as f32, 1.0], 13).unwrap();
    }
    assert!(untrained.train(&poisoned).is_err());
    let ensemble = untrained.as_ensemble().unwrap();
    for i in 0..ensemble.sub_model_count() {
        assert_eq!(ensemble.sub_model(i).unwrap().class_count(), None);
    }

    let mut trained = ctx.make_model().unwrap();
    trained.train(&clusters()).unwrap();
    let before = trained.outputs(&[0.5, 0.0]).unwrap();
    assert!(trained.train(&poisoned).is_err());
    assert_eq!(trained.outputs(&[0.5, 0.0]).unwrap(), before);
    let ensemble = trained.as_ensemble().unwrap();
    for i in 0..ensemble.sub_model_count() {
        assert_eq!(ensemble.sub_model(i).unwrap().class_count(), Some(301));
    }
}
