use crate::dataset::ExtDataset;
use crate::error::Result;
use crate::registry::DatasetConstructor;

/// Lazily allocated sample buffer backing incremental `add` calls.
///
/// The concrete dataset is created on the first push, using the constructor
/// registered under the configured buffer name.
pub struct SampleBuffer {
    kind: String,
    make: DatasetConstructor,
    data: Option<Box<dyn ExtDataset>>,
}

impl SampleBuffer {
    pub fn new(kind: &str, make: DatasetConstructor) -> Self {
        Self {
            kind: kind.to_string(),
            make,
            data: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_allocated(&self) -> bool {
        self.data.is_some()
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |ds| ds.sample_count())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, model: &str, features: &[f32], label: i32) -> Result<()> {
        let data = match &mut self.data {
            Some(data) => data,
            empty => {
                log::info!("allocating {} buffer for {}", self.kind, model);
                empty.insert((self.make)())
            }
        };
        data.add(features, label)
    }

    /// Hand the buffered samples over for training. Pair with
    /// [`restore`](SampleBuffer::restore) when training fails.
    pub fn take(&mut self) -> Option<Box<dyn ExtDataset>> {
        let data = self.data.take()?;
        log::info!(
            "updating model from {} samples, {} features, {} classes",
            data.sample_count(),
            data.feature_count(),
            data.class_count()
        );
        Some(data)
    }

    pub fn restore(&mut self, data: Box<dyn ExtDataset>) {
        self.data = Some(data);
    }
}

impl std::fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("kind", &self.kind)
            .field("samples", &self.len())
            .finish()
    }
}
