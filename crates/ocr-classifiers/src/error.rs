use thiserror::Error;

use crate::math::ShapeError;

/// Errors raised while building class maps, training, or querying classifiers.
///
/// None of these are retried inside the crate; a failed training call leaves
/// the model as it was before the call.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Empty dataset, zero feature dimension, malformed arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A label fell outside the sparse domain of a class map.
    #[error("label {label} is outside the class map domain [0, {domain})")]
    IndexOutOfRange { label: i64, domain: usize },

    /// An optional capability was requested from a model that lacks it.
    #[error("{operation} is not supported by {model}")]
    UnsupportedOperation {
        model: String,
        operation: &'static str,
    },

    #[error("model has not been trained")]
    NotTrained,

    #[error("no component registered under `{0}`")]
    UnknownComponent(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("failed to read or write model state: {0}")]
    Persistence(#[from] serde_json::Error),
}

impl ClassifierError {
    pub(crate) fn unsupported(model: &str, operation: &'static str) -> Self {
        ClassifierError::UnsupportedOperation {
            model: model.to_string(),
            operation,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
