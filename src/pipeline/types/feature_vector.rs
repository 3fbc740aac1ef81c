use std::ops::Deref;
use std::sync::Arc;

/// Fixed-length landmark summary of one frame.
///
/// Backed by a shared slice so window snapshots only bump reference counts.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Arc<[f32]>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values.into())
    }

    /// The placeholder pushed when nothing was detected in a frame.
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim].into())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl Deref for FeatureVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

/// Immutable, oldest-first snapshot of a full window.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWindow(Arc<[FeatureVector]>);

impl FeatureWindow {
    pub(crate) fn new(vectors: Vec<FeatureVector>) -> Self {
        Self(vectors.into())
    }

    pub fn vectors(&self) -> &[FeatureVector] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
