pub mod actuator;
pub mod config;
pub mod error;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use config::Configuration;
pub use error::{ActuatorError, AppError, ConfigError, PipelineError};

pub use actuator::{ActuatorSession, SerialTransport};
pub use pipeline::PipelineService;
