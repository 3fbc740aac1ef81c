use super::transport::{ActuatorTransport, TransportHandle};
use crate::config::ActuatorSettings;
use crate::error::ActuatorError;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Commands understood by the actuator firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    /// Single sweep.
    Trigger,
    /// Continuous sweep mode.
    Start,
    /// Halt and reset position.
    Stop,
}

impl ActuatorCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActuatorCommand::Trigger => "TRIGGER",
            ActuatorCommand::Start => "START",
            ActuatorCommand::Stop => "STOP",
        }
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl LinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LinkState::Connecting,
            2 => LinkState::Connected,
            _ => LinkState::Disconnected,
        }
    }
}

struct SessionInner {
    port: Option<String>,
    handle: Option<Box<dyn TransportHandle>>,
}

/// Owns the link to the actuator.
///
/// Connect, send and disconnect all run under one mutex so commands never
/// interleave on the wire. The link state is mirrored in an atomic for
/// readers that must not wait on in-flight I/O.
pub struct ActuatorSession {
    transport: Arc<dyn ActuatorTransport>,
    baud_rate: u32,
    fingerprints: Vec<String>,
    inner: Mutex<SessionInner>,
    state: AtomicU8,
}

impl ActuatorSession {
    pub fn new(transport: Arc<dyn ActuatorTransport>, settings: &ActuatorSettings) -> Self {
        Self {
            transport,
            baud_rate: settings.baud_rate,
            fingerprints: settings
                .device_fingerprints
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
            inner: Mutex::new(SessionInner {
                port: settings.port.clone(),
                handle: None,
            }),
            state: AtomicU8::new(LinkState::Disconnected as u8),
        }
    }

    pub fn link_state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.link_state() == LinkState::Connected
    }

    pub async fn port(&self) -> Option<String> {
        self.inner.lock().await.port.clone()
    }

    fn set_state(&self, state: LinkState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Picks the first enumerated port whose descriptor matches a known
    /// device. An explicitly configured port is kept as is.
    pub async fn auto_discover(&self) -> Option<String> {
        let mut inner = self.inner.lock().await;
        if inner.port.is_some() {
            return inner.port.clone();
        }

        let ports = match self.transport.enumerate().await {
            Ok(ports) => ports,
            Err(e) => {
                warn!("Failed to enumerate actuator ports: {}", e);
                return None;
            }
        };

        let found = ports.into_iter().find(|port| {
            let descriptor = port.descriptor.to_lowercase();
            self.fingerprints
                .iter()
                .any(|fingerprint| descriptor.contains(fingerprint.as_str()))
        });

        match found {
            Some(port) => {
                info!("Auto-detected actuator port: {} ({})", port.id, port.descriptor);
                inner.port = Some(port.id);
            }
            None => debug!("No known actuator found during discovery"),
        }
        inner.port.clone()
    }

    pub async fn connect(&self) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock().await;
        if inner.handle.is_some() {
            return Ok(());
        }
        self.connect_locked(&mut inner).await
    }

    async fn connect_locked(&self, inner: &mut SessionInner) -> Result<(), ActuatorError> {
        let port = inner.port.clone().ok_or(ActuatorError::NoDeviceConfigured)?;

        self.set_state(LinkState::Connecting);
        match self.transport.open(&port, self.baud_rate).await {
            Ok(handle) => {
                inner.handle = Some(handle);
                self.set_state(LinkState::Connected);
                info!("Connected to actuator on {}", port);
                Ok(())
            }
            Err(source) => {
                self.set_state(LinkState::Disconnected);
                warn!("Error connecting to actuator on {}: {}", port, source);
                Err(ActuatorError::Connection { port, source })
            }
        }
    }

    /// Writes `command` followed by a newline, connecting first if needed.
    ///
    /// At most one connection attempt is made per call. A failed write drops
    /// the link so the next call reconnects.
    pub async fn send_command(&self, command: ActuatorCommand) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock().await;

        if inner.handle.is_none() {
            match self.connect_locked(&mut inner).await {
                Ok(()) => {}
                Err(ActuatorError::NoDeviceConfigured) => {
                    return Err(ActuatorError::NoDeviceConfigured)
                }
                Err(e) => {
                    return Err(ActuatorError::NotConnected {
                        port: inner.port.clone().unwrap_or_default(),
                        reason: e.to_string(),
                    })
                }
            }
        }

        let line = format!("{}\n", command.as_str());
        let result = match inner.handle.as_mut() {
            Some(handle) => handle.write_all(line.as_bytes()).await,
            None => {
                return Err(ActuatorError::NotConnected {
                    port: inner.port.clone().unwrap_or_default(),
                    reason: "link closed".to_string(),
                })
            }
        };

        if let Err(e) = result {
            inner.handle = None;
            self.set_state(LinkState::Disconnected);
            warn!("Error sending {} to actuator: {}", command, e);
            return Err(ActuatorError::Write(e));
        }

        info!("Sent command to actuator: {}", command);
        Ok(())
    }

    pub async fn trigger(&self) -> Result<(), ActuatorError> {
        self.send_command(ActuatorCommand::Trigger).await
    }

    pub async fn start_continuous(&self) -> Result<(), ActuatorError> {
        self.send_command(ActuatorCommand::Start).await
    }

    pub async fn stop_continuous(&self) -> Result<(), ActuatorError> {
        self.send_command(ActuatorCommand::Stop).await
    }

    /// Closes the link if open. Safe to call repeatedly.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(mut handle) = inner.handle.take() {
            if let Err(e) = handle.close().await {
                warn!("Error closing actuator link: {}", e);
            }
            info!("Disconnected from actuator");
        }
        self.set_state(LinkState::Disconnected);
    }
}
