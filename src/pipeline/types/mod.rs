mod action_label;
mod decision;
mod feature_vector;
mod frame_result;
mod raw_frame;

pub use action_label::ActionLabels;
pub use decision::Decision;
pub use feature_vector::{FeatureVector, FeatureWindow};
pub use frame_result::{FrameResult, HealthReport};
pub use raw_frame::RawFrame;
