use crate::math::Array1;

/// Per-class scores returned by a classifier, indexed by class.
///
/// Classes past the end of the vector read as zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputVector {
    scores: Array1<f32>,
}

impl OutputVector {
    pub fn zeros(len: usize) -> Self {
        Self {
            scores: Array1::zeros(len),
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, class: usize) -> f32 {
        self.scores.get(class).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, class: usize, value: f32) {
        self.scores[class] = value;
    }

    pub fn argmax(&self) -> Option<usize> {
        self.scores.argmax()
    }

    pub fn as_slice(&self) -> &[f32] {
        self.scores.as_slice()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.scores.into()
    }
}

impl From<Vec<f32>> for OutputVector {
    fn from(value: Vec<f32>) -> Self {
        Self {
            scores: Array1::from_vec(value),
        }
    }
}
