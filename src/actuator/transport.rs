use async_trait::async_trait;

/// One enumerated endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Path or identifier passed to [`ActuatorTransport::open`].
    pub id: String,
    /// Human readable description used for device fingerprinting.
    pub descriptor: String,
}

impl PortInfo {
    pub fn new(id: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Serial-like link to the actuator.
#[async_trait]
pub trait ActuatorTransport: Send + Sync {
    async fn enumerate(&self) -> std::io::Result<Vec<PortInfo>>;

    async fn open(&self, id: &str, baud_rate: u32) -> std::io::Result<Box<dyn TransportHandle>>;
}

/// An open endpoint. Dropping the handle releases the device.
#[async_trait]
pub trait TransportHandle: Send {
    async fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    async fn close(&mut self) -> std::io::Result<()>;
}
