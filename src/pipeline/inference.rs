use crate::error::BoxError;
use crate::pipeline::types::{FeatureVector, FeatureWindow};
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;

/// Landmark extraction for a single decoded frame.
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    /// Returns `Ok(None)` when nothing was detected in the frame.
    async fn extract(&self, image: &DynamicImage) -> Result<Option<FeatureVector>, BoxError>;
}

/// Sequence classifier over a full window.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// One probability per label, in label order.
    async fn predict(&self, window: &FeatureWindow) -> Result<Vec<f32>, BoxError>;
}

/// Extraction capability, fixed at construction.
#[derive(Clone)]
pub enum Extractor {
    Available(Arc<dyn FeatureExtractor>),
    Unavailable,
}

impl Extractor {
    pub fn available(extractor: impl FeatureExtractor + 'static) -> Self {
        Self::Available(Arc::new(extractor))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Classifier capability, fixed at construction.
#[derive(Clone)]
pub enum Model {
    Ready(Arc<dyn Classifier>),
    Unavailable,
}

impl Model {
    pub fn ready(classifier: impl Classifier + 'static) -> Self {
        Self::Ready(Arc::new(classifier))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
