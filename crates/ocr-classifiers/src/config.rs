use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ClassifierError;

/// Name of the buffer dataset allocated on the first `add` call.
pub const DEFAULT_BUFFER: &str = "rowdataset8";

/// Name of the model built when a caller does not ask for one.
pub const DEFAULT_MODEL: &str = "nearest-mean";

/// Central configuration for classifier construction.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Registry name of the dataset buffering incremental samples.
    pub buffer: String,

    /// Registry name of the model to construct.
    pub model: String,

    pub ensemble: EnsembleConfig,
}

/// Hyper-parameters of the bagging ensemble.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnsembleConfig {
    pub members: usize,
    /// Registry name of each member model.
    pub member: String,
    pub seed: u64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            members: 5,
            member: DEFAULT_MODEL.to_string(),
            seed: 0,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BUFFER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            ensemble: EnsembleConfig::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn new(model: &str, buffer: &str) -> Self {
        Self {
            buffer: buffer.to_string(),
            model: model.to_string(),
            ..Self::default()
        }
    }

    /// Set one option by name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ClassifierError> {
        let invalid = |what: &str| {
            ClassifierError::InvalidInput(format!("bad value `{}` for {}", value, what))
        };
        match key.trim() {
            "buffer" | "cds" => self.buffer = value.trim().to_string(),
            "model" => self.model = value.trim().to_string(),
            "members" => {
                self.ensemble.members = value.trim().parse().map_err(|_| invalid("members"))?
            }
            "member" => self.ensemble.member = value.trim().to_string(),
            "seed" => self.ensemble.seed = value.trim().parse().map_err(|_| invalid("seed"))?,
            other => {
                return Err(ClassifierError::InvalidInput(format!(
                    "unknown configuration option: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// Parses comma separated `key=value` pairs on top of the defaults,
/// e.g. `model=bagger,members=3,buffer=rowdataset`.
impl FromStr for ClassifierConfig {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = ClassifierConfig::default();
        for pair in s.split(',').filter(|p| !p.trim().is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ClassifierError::InvalidInput(format!("expected key=value, got `{}`", pair))
            })?;
            config.set(key, value)?;
        }
        Ok(config)
    }
}
