use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Decision;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameResult {
    pub frame_id: Uuid,
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<IndexMap<String, f32>>,
    pub triggered: bool,
    pub processed_at: DateTime<Utc>,
}

impl FrameResult {
    pub fn not_detected(frame_id: Uuid) -> Self {
        Self {
            frame_id,
            detected: false,
            action: None,
            confidence: None,
            distribution: None,
            triggered: false,
            processed_at: Utc::now(),
        }
    }

    pub fn classified(frame_id: Uuid, decision: Decision, triggered: bool) -> Self {
        Self {
            frame_id,
            detected: decision.is_detected(),
            action: decision.label,
            confidence: Some(decision.confidence),
            distribution: Some(decision.distribution),
            triggered,
            processed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub model_ready: bool,
    pub actuator_connected: bool,
    pub threshold: f32,
}
