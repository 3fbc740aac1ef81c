pub mod inference;
pub mod services;
pub mod types;

pub use inference::{Classifier, Extractor, FeatureExtractor, Model};
pub use services::{
    ActionFilter, ClassificationPolicy, FeatureBuffer, PipelineService, TriggerCoordinator,
};
pub use types::{ActionLabels, Decision, FeatureVector, FeatureWindow, FrameResult, RawFrame};
