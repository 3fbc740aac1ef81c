use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Outcome of classifying one full window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// `None` when the top probability did not clear the threshold.
    pub label: Option<String>,
    /// Top probability, reported even when no label fired.
    pub confidence: f32,
    /// Every label's probability, in label order.
    pub distribution: IndexMap<String, f32>,
}

impl Decision {
    pub fn is_detected(&self) -> bool {
        self.label.is_some()
    }
}
