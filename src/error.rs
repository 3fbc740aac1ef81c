use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Pipeline Error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Pipeline Error Type
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Classifier is not loaded")]
    ClassifierUnavailable,
    #[error("Classifier failed: {0}")]
    Classifier(#[source] BoxError),
    #[error("Actuator Error: {0}")]
    Actuator(#[from] ActuatorError),
}

// Actuator Error Type
#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("No actuator port configured")]
    NoDeviceConfigured,
    #[error("Failed to connect to actuator on {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Actuator on {port} is not connected: {reason}")]
    NotConnected { port: String, reason: String },
    #[error("Failed to write command to actuator: {0}")]
    Write(#[source] std::io::Error),
}
