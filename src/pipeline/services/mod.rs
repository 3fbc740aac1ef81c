pub mod classification_policy;
pub mod classifier_service;
pub mod feature_buffer;
pub mod pipeline_service;
pub mod trigger_coordinator;

pub use classification_policy::ClassificationPolicy;
pub use classifier_service::{ClassifierService, ClassifierStage};
pub use feature_buffer::{FeatureBuffer, WindowState};
pub use pipeline_service::{PipelineService, PipelineServiceBuilder};
pub use trigger_coordinator::{ActionFilter, TriggerCoordinator, TriggerOutcome};
