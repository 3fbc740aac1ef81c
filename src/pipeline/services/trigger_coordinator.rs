use crate::actuator::{ActuatorCommand, ActuatorSession};
use crate::error::ActuatorError;
use crate::pipeline::types::Decision;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Which detected labels may fire the actuator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFilter {
    Any,
    Only(HashSet<String>),
}

impl ActionFilter {
    /// An empty list means any label.
    pub fn from_actions(actions: &[String]) -> Self {
        if actions.is_empty() {
            ActionFilter::Any
        } else {
            ActionFilter::Only(actions.iter().cloned().collect())
        }
    }

    pub fn allows(&self, label: &str) -> bool {
        match self {
            ActionFilter::Any => true,
            ActionFilter::Only(labels) => labels.contains(label),
        }
    }
}

#[derive(Debug)]
pub enum TriggerOutcome {
    /// No label, or the label is filtered out.
    Skipped,
    /// Within the minimum interval of the previous trigger.
    Suppressed,
    Sent,
    Failed(ActuatorError),
}

impl TriggerOutcome {
    pub fn triggered(&self) -> bool {
        matches!(self, TriggerOutcome::Sent)
    }
}

/// Maps decisions onto actuator triggers.
///
/// The window's temporal smoothing is the only debounce unless
/// `min_interval` is set.
pub struct TriggerCoordinator {
    actuator: Arc<ActuatorSession>,
    filter: ActionFilter,
    min_interval: Option<Duration>,
    last_trigger: Mutex<Option<Instant>>,
}

impl TriggerCoordinator {
    pub fn new(actuator: Arc<ActuatorSession>, filter: ActionFilter) -> Self {
        Self {
            actuator,
            filter,
            min_interval: None,
            last_trigger: Mutex::new(None),
        }
    }

    pub fn with_min_interval(mut self, min_interval: Option<Duration>) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn filter(&self) -> &ActionFilter {
        &self.filter
    }

    pub async fn maybe_trigger(&self, decision: &Decision) -> bool {
        self.dispatch(decision).await.triggered()
    }

    pub async fn dispatch(&self, decision: &Decision) -> TriggerOutcome {
        let Some(label) = decision.label.as_deref() else {
            return TriggerOutcome::Skipped;
        };
        if !self.filter.allows(label) {
            debug!("Label {} is not configured to trigger the actuator", label);
            return TriggerOutcome::Skipped;
        }

        let mut last_trigger = self.last_trigger.lock().await;
        if let (Some(min_interval), Some(last)) = (self.min_interval, *last_trigger) {
            if last.elapsed() < min_interval {
                debug!(
                    "Suppressing trigger for {}, last one was {:?} ago",
                    label,
                    last.elapsed()
                );
                return TriggerOutcome::Suppressed;
            }
        }

        match self.fire().await {
            Ok(()) => {
                *last_trigger = Some(Instant::now());
                TriggerOutcome::Sent
            }
            Err(e) => TriggerOutcome::Failed(e),
        }
    }

    /// Sends a single trigger, bypassing label filter and interval guard.
    pub async fn fire(&self) -> Result<(), ActuatorError> {
        self.actuator.send_command(ActuatorCommand::Trigger).await
    }
}
