use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One encoded camera frame as received from the caller.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub id: Uuid,
    pub payload: Vec<u8>,
    /// Per-request override of the global threshold.
    pub threshold: Option<f32>,
    pub received_at: DateTime<Utc>,
}

impl RawFrame {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            threshold: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}
