//! ocr-classifiers: sparse-label classifier plumbing for OCR pipelines.
//!
//! Character classifiers see labels drawn from a large, gapped code space,
//! while most classifier implementations want contiguous class indices.
//! This crate provides the class remapping between the two, a classifier
//! contract with incremental sample buffering, an adapter that lifts dense
//! classifiers into the sparse label space, a construct-by-name registry,
//! and confusion statistics for evaluation.
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod math;
pub mod models;
pub mod output;
pub mod registry;
pub mod remap;
pub mod translate;

pub use config::ClassifierConfig;
pub use dataset::{Dataset, ExtDataset, RowDataset, RowDataset8};
pub use error::{ClassifierError, Result};
pub use evaluate::{confusion_matrix, summarize, top_confusions, ConfusionMatrix};
pub use models::classifier_trait::{Classifier, Ensemble};
pub use models::dense::{DenseModel, DenseTrainer};
pub use output::OutputVector;
pub use registry::{Context, Registry};
pub use remap::ClassMap;

/// Initialize `env_logger`, filtered by `OCR_CLASSIFIERS_LOG` (default `info`).
pub fn init_logger() {
    let _ = env_logger::Builder::default()
        .parse_env(env_logger::Env::default().filter_or("OCR_CLASSIFIERS_LOG", "info"))
        .try_init();
}
