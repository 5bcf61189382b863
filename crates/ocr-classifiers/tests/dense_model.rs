//! Integration tests for the dense-model adapter and incremental training.

use ocr_classifiers::dataset::{Dataset, ExtDataset, RowDataset, RowDataset8};
use ocr_classifiers::error::{ClassifierError, Result};
use ocr_classifiers::models::nearest_mean::NearestMean;
use ocr_classifiers::{Classifier, DenseModel, DenseTrainer};

/// Dense trainer that records how it was trained and always votes for
/// dense class 0.
#[derive(Debug, Default)]
struct RecordingTrainer {
    train_calls: usize,
    last_samples: usize,
    last_classes: usize,
    last_labels: Vec<i32>,
}

impl DenseTrainer for RecordingTrainer {
    fn name(&self) -> &str {
        "recording"
    }

    fn train_dense(&mut self, dataset: &dyn Dataset) -> Result<()> {
        self.train_calls += 1;
        self.last_samples = dataset.sample_count();
        self.last_classes = dataset.class_count();
        self.last_labels = (0..dataset.sample_count()).map(|i| dataset.label_at(i)).collect();
        Ok(())
    }

    fn outputs_dense(&self, _features: &[f32]) -> Result<(Vec<f32>, f32)> {
        let mut scores = vec![0.0; self.last_classes];
        scores[0] = 1.0;
        Ok((scores, 0.5))
    }
}

/// Dense trainer whose fitting always fails.
#[derive(Debug, Default)]
struct FailingTrainer;

impl DenseTrainer for FailingTrainer {
    fn name(&self) -> &str {
        "failing"
    }

    fn train_dense(&mut self, _dataset: &dyn Dataset) -> Result<()> {
        Err(ClassifierError::InvalidInput("fit diverged".to_string()))
    }

    fn outputs_dense(&self, _features: &[f32]) -> Result<(Vec<f32>, f32)> {
        Ok((Vec::new(), 0.0))
    }
}

fn recording_model() -> DenseModel<RecordingTrainer> {
    DenseModel::new(RecordingTrainer::default(), "rowdataset8", RowDataset8::boxed)
}

fn dataset(rows: &[(&[f32], i32)]) -> RowDataset<f32> {
    let mut ds = RowDataset::new();
    for (features, label) in rows {
        ds.add(features, *label).unwrap();
    }
    ds
}

// ---------------------------------------------------------------------------
// Incremental buffering
// ---------------------------------------------------------------------------

#[test]
fn two_adds_and_update_train_once_then_release_buffer() {
    let mut model = recording_model();
    model.add(&[1.0, 2.0], 65).unwrap();
    model.add(&[3.0, 4.0], 97).unwrap();
    assert!(model.buffer().is_allocated());
    assert_eq!(model.buffer().len(), 2);
    assert_eq!(model.trainer().train_calls, 0);

    model.update_model().unwrap();
    assert_eq!(model.trainer().train_calls, 1);
    assert_eq!(model.trainer().last_samples, 2);
    assert!(!model.buffer().is_allocated());

    let (outputs, cost) = model.outputs(&[1.0, 2.0]).unwrap();
    assert_eq!(outputs.len(), 98);
    assert_eq!(outputs.get(65), 1.0);
    assert_eq!(cost, 0.5);
    assert_eq!(model.classify(&[0.0, 0.0]).unwrap(), 65);
}

#[test]
fn update_without_buffer_is_a_no_op() {
    let mut model = recording_model();
    model.update_model().unwrap();
    assert_eq!(model.trainer().train_calls, 0);
    assert!(model.class_map().is_none());
}

#[test]
fn failed_update_keeps_buffered_samples() {
    let mut model = DenseModel::new(FailingTrainer, "rowdataset", RowDataset::<f32>::boxed);
    model.add(&[1.0], 3).unwrap();
    assert!(model.update_model().is_err());
    assert_eq!(model.buffer().len(), 1);
    assert!(model.class_map().is_none());
}

// ---------------------------------------------------------------------------
// Batch training and the class map
// ---------------------------------------------------------------------------

#[test]
fn empty_dataset_is_rejected_without_building_a_map() {
    let mut model = recording_model();
    let err = model.train(&RowDataset::<f32>::new()).unwrap_err();
    assert!(matches!(err, ClassifierError::InvalidInput(_)));
    assert!(model.class_map().is_none());
    assert_eq!(model.trainer().train_calls, 0);
}

#[test]
fn featureless_samples_are_rejected() {
    let mut model = recording_model();
    let ds = dataset(&[(&[], 1), (&[], 2)]);
    assert!(matches!(
        model.train(&ds),
        Err(ClassifierError::InvalidInput(_))
    ));
    assert!(model.class_map().is_none());
}

#[test]
fn all_unlabeled_dataset_is_rejected() {
    let mut model = recording_model();
    let ds = dataset(&[(&[1.0], -1), (&[2.0], -1)]);
    assert!(model.train(&ds).is_err());
    assert!(model.class_map().is_none());
}

#[test]
fn failed_fit_does_not_persist_class_map() {
    let mut model = DenseModel::new(FailingTrainer, "rowdataset", RowDataset::<f32>::boxed);
    let ds = dataset(&[(&[1.0], 4)]);
    assert!(model.train(&ds).is_err());
    assert!(model.class_map().is_none());
}

#[test]
fn trainer_sees_dense_labels_and_class_count() {
    let mut model = recording_model();
    let ds = dataset(&[(&[0.0], 500), (&[1.0], 20), (&[2.0], -1), (&[3.0], 500)]);
    model.train(&ds).unwrap();
    let trainer = model.trainer();
    assert_eq!(trainer.last_classes, 2);
    assert_eq!(trainer.last_labels, vec![1, 0, -1, 1]);
    let map = model.class_map().unwrap();
    assert_eq!(map.sparse_class_count(), 501);
    assert_eq!(model.class_count(), Some(501));
}

#[test]
fn class_map_is_frozen_after_first_fit() {
    let mut model = recording_model();
    model.train(&dataset(&[(&[0.0], 10), (&[1.0], 30)])).unwrap();
    let first = model.class_map().cloned().unwrap();

    model
        .train(&dataset(&[(&[0.0], 30), (&[1.0], 20), (&[2.0], 99)]))
        .unwrap();
    assert_eq!(model.class_map(), Some(&first));
    assert_eq!(model.trainer().train_calls, 2);
    // 20 is inside the old domain but unused, 99 is outside it
    assert_eq!(model.trainer().last_labels, vec![1, -1, -1]);
}

#[test]
fn untrained_model_cannot_score() {
    let model = recording_model();
    assert!(matches!(
        model.outputs(&[0.0]),
        Err(ClassifierError::NotTrained)
    ));
}

// ---------------------------------------------------------------------------
// Nearest mean through the adapter
// ---------------------------------------------------------------------------

fn letters() -> RowDataset<f32> {
    dataset(&[
        (&[0.0, 0.0], 'a' as i32),
        (&[1.0, 0.0], 'a' as i32),
        (&[20.0, 20.0], 'z' as i32),
        (&[21.0, 20.0], 'z' as i32),
        (&[0.0, 20.0], 'M' as i32),
        (&[1.0, 21.0], 'M' as i32),
    ])
}

#[test]
fn nearest_mean_classifies_in_sparse_label_space() {
    let mut model = DenseModel::new(NearestMean::default(), "rowdataset", RowDataset::<f32>::boxed);
    model.train(&letters()).unwrap();
    assert_eq!(model.classify(&[0.5, 0.2]).unwrap(), 'a' as usize);
    assert_eq!(model.classify(&[19.0, 21.0]).unwrap(), 'z' as usize);
    assert_eq!(model.classify(&[0.0, 19.0]).unwrap(), 'M' as usize);
    assert_eq!(model.feature_count(), Some(2));
    assert_eq!(model.prototype_count(), 3);
    assert_eq!(model.prototype(0, 0).unwrap(), vec![0.5, 20.5]);
}

#[test]
fn optional_capabilities_report_unsupported() {
    let model = recording_model();
    assert!(matches!(
        model.prototype(0, 0),
        Err(ClassifierError::UnsupportedOperation { .. })
    ));
    assert_eq!(model.prototype_count(), 0);
    assert!(model.as_ensemble().is_none());

    let mut target = recording_model();
    assert!(matches!(
        target.copy_from(&model),
        Err(ClassifierError::UnsupportedOperation { .. })
    ));
}

#[test]
fn saved_model_restores_map_and_parameters() -> anyhow::Result<()> {
    let mut model = DenseModel::new(NearestMean::default(), "rowdataset", RowDataset::<f32>::boxed);
    model.train(&letters())?;

    let mut bytes = Vec::new();
    model.save_json(&mut bytes)?;
    let json = String::from_utf8(bytes.clone())?;
    assert!(json.contains("dense_of") && json.contains("sparse_of"));

    let mut restored: DenseModel<NearestMean> =
        DenseModel::load_json(bytes.as_slice(), "rowdataset", RowDataset::<f32>::boxed)?;
    assert_eq!(restored.class_map(), model.class_map());
    assert_eq!(restored.trainer(), model.trainer());
    assert_eq!(restored.outputs(&[3.0, 4.0])?, model.outputs(&[3.0, 4.0])?);

    // the restored map is frozen: a new label does not extend it
    restored.train(&dataset(&[(&[5.0, 5.0], 'a' as i32), (&[9.0, 9.0], 'q' as i32)]))?;
    assert_eq!(restored.class_map(), model.class_map());
    Ok(())
}

#[test]
fn untrained_model_cannot_be_saved() {
    let model = DenseModel::new(NearestMean::default(), "rowdataset", RowDataset::<f32>::boxed);
    let mut bytes = Vec::new();
    assert!(matches!(
        model.save_json(&mut bytes),
        Err(ClassifierError::NotTrained)
    ));
}

#[test]
fn corrupted_state_is_rejected() {
    let json = r#"{"dense_of":[0,0],"sparse_of":[0,1],"trainer":{"nfeatures":1,"means":[[0.0],[1.0]],"counts":[1,1]}}"#;
    let loaded = DenseModel::<NearestMean>::load_json(json.as_bytes(), "rowdataset", RowDataset::<f32>::boxed);
    assert!(matches!(loaded, Err(ClassifierError::InvalidInput(_))));
}
