use crate::error::PipelineError;
use crate::pipeline::types::{FeatureVector, FeatureWindow};
use std::collections::VecDeque;

/// Result of a single push.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowState {
    /// Window not yet at capacity; `len` vectors buffered so far.
    Filling { len: usize },
    Full(FeatureWindow),
}

/// Fixed-capacity sliding window of feature vectors.
#[derive(Debug)]
pub struct FeatureBuffer {
    vectors: VecDeque<FeatureVector>,
    capacity: usize,
    dim: usize,
}

impl FeatureBuffer {
    pub fn new(capacity: usize, dim: usize) -> Self {
        Self {
            vectors: VecDeque::with_capacity(capacity),
            capacity,
            dim,
        }
    }

    /// Appends `vector`, evicting the oldest entry once the window is full.
    pub fn push(&mut self, vector: FeatureVector) -> Result<WindowState, PipelineError> {
        if vector.len() != self.dim {
            return Err(PipelineError::InvalidInput(format!(
                "feature vector has length {}, expected {}",
                vector.len(),
                self.dim
            )));
        }

        if self.vectors.len() >= self.capacity {
            self.vectors.pop_front();
        }
        self.vectors.push_back(vector);

        if self.vectors.len() == self.capacity {
            Ok(WindowState::Full(FeatureWindow::new(
                self.vectors.iter().cloned().collect(),
            )))
        } else {
            Ok(WindowState::Filling {
                len: self.vectors.len(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn snapshot(&self) -> Vec<FeatureVector> {
        self.vectors.iter().cloned().collect()
    }
}
