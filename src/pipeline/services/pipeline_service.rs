use super::classification_policy::ClassificationPolicy;
use super::classifier_service::ClassifierStage;
use super::feature_buffer::{FeatureBuffer, WindowState};
use super::trigger_coordinator::{ActionFilter, TriggerCoordinator, TriggerOutcome};
use crate::actuator::{ActuatorSession, ActuatorTransport, SerialTransport};
use crate::config::Configuration;
use crate::error::{ConfigError, PipelineError};
use crate::pipeline::inference::{Extractor, FeatureExtractor, Model};
use crate::pipeline::types::{
    ActionLabels, FeatureVector, FrameResult, HealthReport, RawFrame,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Stateful orchestrator behind every inbound request.
///
/// Frame submissions are serialized on the window mutex only for the push
/// and snapshot; classification and triggering run on the immutable
/// snapshot after the lock is released. The threshold lives in an atomic
/// and is read once per decision.
pub struct PipelineService {
    buffer: Mutex<FeatureBuffer>,
    feature_dim: usize,
    threshold: AtomicU32,
    extractor: Extractor,
    classifier: Option<ClassifierStage>,
    policy: ClassificationPolicy,
    trigger: TriggerCoordinator,
    actuator: Arc<ActuatorSession>,
}

impl PipelineService {
    pub fn builder(configuration: Configuration) -> PipelineServiceBuilder {
        PipelineServiceBuilder::new(configuration)
    }

    pub async fn submit_frame(&self, frame: RawFrame) -> Result<FrameResult, PipelineError> {
        if frame.payload.is_empty() {
            return Err(PipelineError::InvalidInput(
                "no frame data provided".to_string(),
            ));
        }
        if let Some(threshold) = frame.threshold {
            validate_threshold(threshold)?;
        }

        let extractor = match &self.extractor {
            Extractor::Available(extractor) => extractor,
            Extractor::Unavailable => {
                debug!("Feature extractor unavailable, skipping frame {}", frame.id);
                return Ok(FrameResult::not_detected(frame.id));
            }
        };
        let classifier = match self.classifier() {
            Ok(classifier) => classifier,
            Err(e) => {
                debug!("{}, skipping frame {}", e, frame.id);
                return Ok(FrameResult::not_detected(frame.id));
            }
        };

        let vector = self.extract_features(extractor.as_ref(), &frame).await;

        let state = {
            let mut buffer = self.buffer.lock().await;
            buffer.push(vector)?
        };
        let window = match state {
            WindowState::Filling { len } => {
                debug!("Window filling ({}) after frame {}", len, frame.id);
                return Ok(FrameResult::not_detected(frame.id));
            }
            WindowState::Full(window) => window,
        };

        let probabilities = classifier.classify(window).await?;
        let threshold = frame.threshold.unwrap_or_else(|| self.threshold());
        let decision = self.policy.decide(&probabilities, threshold)?;

        let outcome = self.trigger.dispatch(&decision).await;
        match &outcome {
            TriggerOutcome::Sent => info!(
                "Triggered actuator for {:?} ({:.3})",
                decision.label, decision.confidence
            ),
            TriggerOutcome::Failed(e) => warn!(
                "Detected {:?} but actuator trigger failed: {}",
                decision.label, e
            ),
            TriggerOutcome::Skipped | TriggerOutcome::Suppressed => {}
        }

        debug!(
            "Frame {} classified: label={:?} confidence={:.3} threshold={}",
            frame.id, decision.label, decision.confidence, threshold
        );
        Ok(FrameResult::classified(frame.id, decision, outcome.triggered()))
    }

    /// Decode failures, extractor errors and empty detections all become the
    /// zero vector so the window keeps one slot per frame.
    async fn extract_features(
        &self,
        extractor: &dyn FeatureExtractor,
        frame: &RawFrame,
    ) -> FeatureVector {
        let dim = self.feature_dim;
        let image = match image::load_from_memory(&frame.payload) {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to decode frame {}: {}", frame.id, e);
                return FeatureVector::zeros(dim);
            }
        };

        match extractor.extract(&image).await {
            Ok(Some(vector)) => vector,
            Ok(None) => {
                debug!("No landmarks detected in frame {}", frame.id);
                FeatureVector::zeros(dim)
            }
            Err(e) => {
                warn!("Feature extraction failed for frame {}: {}", frame.id, e);
                FeatureVector::zeros(dim)
            }
        }
    }

    fn classifier(&self) -> Result<&ClassifierStage, PipelineError> {
        self.classifier
            .as_ref()
            .ok_or(PipelineError::ClassifierUnavailable)
    }

    pub fn threshold(&self) -> f32 {
        f32::from_bits(self.threshold.load(Ordering::Acquire))
    }

    pub fn set_threshold(&self, value: f32) -> Result<f32, PipelineError> {
        validate_threshold(value)?;
        self.threshold.store(value.to_bits(), Ordering::Release);
        info!("Detection threshold set to {}", value);
        Ok(value)
    }

    /// Sends a single trigger without classification, for operator testing.
    pub async fn manual_trigger(&self, label: &str) -> Result<(), PipelineError> {
        info!("Manual trigger requested ({})", label);
        self.trigger.fire().await?;
        Ok(())
    }

    pub async fn start_continuous(&self) -> Result<(), PipelineError> {
        self.actuator.start_continuous().await?;
        Ok(())
    }

    pub async fn stop_continuous(&self) -> Result<(), PipelineError> {
        self.actuator.stop_continuous().await?;
        Ok(())
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            model_ready: self.classifier.is_some(),
            actuator_connected: self.actuator.is_connected(),
            threshold: self.threshold(),
        }
    }

    /// Resolves the actuator port, scanning for known devices if none is
    /// configured.
    pub async fn discover_actuator(&self) -> Option<String> {
        self.actuator.auto_discover().await
    }

    pub fn labels(&self) -> &ActionLabels {
        self.policy.labels()
    }

    pub fn action_filter(&self) -> &ActionFilter {
        self.trigger.filter()
    }

    pub async fn window_snapshot(&self) -> Vec<FeatureVector> {
        self.buffer.lock().await.snapshot()
    }

    pub async fn shutdown(&self) {
        info!("Shutting down pipeline service");
        self.actuator.disconnect().await;
    }
}

fn validate_threshold(value: f32) -> Result<(), PipelineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PipelineError::InvalidInput(format!(
            "threshold must be between 0.0 and 1.0, got {}",
            value
        )))
    }
}

pub struct PipelineServiceBuilder {
    configuration: Configuration,
    extractor: Extractor,
    model: Model,
    transport: Option<Arc<dyn ActuatorTransport>>,
}

impl PipelineServiceBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            extractor: Extractor::Unavailable,
            model: Model::Unavailable,
            transport: None,
        }
    }

    pub fn extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    // Defaults to the serial transport when not set.
    pub fn transport(mut self, transport: Arc<dyn ActuatorTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<PipelineService, ConfigError> {
        self.configuration.validate()?;
        let Configuration {
            pipeline,
            actuator,
            trigger,
            ..
        } = self.configuration;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(SerialTransport::new()) as Arc<dyn ActuatorTransport>);
        let actuator = Arc::new(ActuatorSession::new(transport, &actuator));
        let trigger = TriggerCoordinator::new(
            actuator.clone(),
            ActionFilter::from_actions(&trigger.actions),
        )
        .with_min_interval(trigger.min_interval());

        let classifier = match self.model {
            Model::Ready(classifier) => Some(ClassifierStage::new(
                classifier,
                pipeline.classifier_timeout(),
            )),
            Model::Unavailable => None,
        };

        info!(
            "Pipeline ready: window={} dim={} labels={:?} threshold={} extractor={} model={}",
            pipeline.sequence_length,
            pipeline.feature_dim,
            pipeline.labels,
            pipeline.threshold,
            self.extractor.is_available(),
            classifier.is_some()
        );

        Ok(PipelineService {
            buffer: Mutex::new(FeatureBuffer::new(
                pipeline.sequence_length,
                pipeline.feature_dim,
            )),
            feature_dim: pipeline.feature_dim,
            threshold: AtomicU32::new(pipeline.threshold.to_bits()),
            extractor: self.extractor,
            classifier,
            policy: ClassificationPolicy::new(ActionLabels::new(pipeline.labels)),
            trigger,
            actuator,
        })
    }
}
