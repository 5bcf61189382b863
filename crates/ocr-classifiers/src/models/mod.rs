pub mod bagger;
pub mod buffer;
pub mod dense;
pub mod nearest_mean;

pub mod classifier_trait;
