use super::transport::{ActuatorTransport, PortInfo, TransportHandle};
use async_trait::async_trait;
use serialport::{
    DataBits, FlowControl, Parity, SerialPort, SerialPortInfo, SerialPortType, StopBits,
};
use std::io::{ErrorKind, Write};
use std::time::Duration;
use tracing::debug;

const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

// USB vendor ids of common adapter chips. Their product strings are often
// generic ("USB Serial"), so the chip name is added to the descriptor.
const KNOWN_VENDORS: &[(u16, &str)] = &[
    (0x2341, "Arduino"),
    (0x2a03, "Arduino"),
    (0x1a86, "CH340"),
    (0x10c4, "CP210x"),
    (0x0403, "FTDI"),
];

/// Transport over the host's serial ports.
///
/// Ports are opened raw 8N1 at the configured baud rate with no flow
/// control, so command bytes reach the device unchanged.
#[derive(Debug, Clone, Default)]
pub struct SerialTransport;

impl SerialTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Human readable description of a port: USB product and manufacturer
/// strings plus the adapter chip, or the port name for non-USB ports.
pub fn describe(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => {
            let mut parts: Vec<&str> = Vec::new();
            if let Some(product) = usb.product.as_deref() {
                parts.push(product);
            }
            if let Some(manufacturer) = usb.manufacturer.as_deref() {
                parts.push(manufacturer);
            }
            if let Some((_, chip)) = KNOWN_VENDORS.iter().find(|(vid, _)| *vid == usb.vid) {
                parts.push(chip);
            }
            if parts.is_empty() {
                format!("USB {:04x}:{:04x}", usb.vid, usb.pid)
            } else {
                parts.join(" ")
            }
        }
        SerialPortType::BluetoothPort => format!("{} (bluetooth)", port.port_name),
        SerialPortType::PciPort | SerialPortType::Unknown => port.port_name.clone(),
    }
}

#[async_trait]
impl ActuatorTransport for SerialTransport {
    async fn enumerate(&self) -> std::io::Result<Vec<PortInfo>> {
        let ports = tokio::task::spawn_blocking(serialport::available_ports)
            .await
            .map_err(std::io::Error::other)??;
        Ok(ports
            .iter()
            .map(|port| PortInfo::new(port.port_name.clone(), describe(port)))
            .collect())
    }

    async fn open(&self, id: &str, baud_rate: u32) -> std::io::Result<Box<dyn TransportHandle>> {
        let builder = serialport::new(id, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(WRITE_TIMEOUT);
        let port = tokio::task::spawn_blocking(move || builder.open())
            .await
            .map_err(std::io::Error::other)??;
        debug!("Opened {} at {} baud", id, baud_rate);
        Ok(Box::new(SerialHandle { port: Some(port) }))
    }
}

struct SerialHandle {
    port: Option<Box<dyn SerialPort>>,
}

#[async_trait]
impl TransportHandle for SerialHandle {
    async fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let mut port = self
            .port
            .take()
            .ok_or_else(|| std::io::Error::new(ErrorKind::NotConnected, "device closed"))?;
        let bytes = bytes.to_vec();
        let (port, result) = tokio::task::spawn_blocking(move || {
            let result = port.write_all(&bytes).and_then(|()| port.flush());
            (port, result)
        })
        .await
        .map_err(std::io::Error::other)?;
        self.port = Some(port);
        result
    }

    async fn close(&mut self) -> std::io::Result<()> {
        if let Some(mut port) = self.port.take() {
            tokio::task::spawn_blocking(move || port.flush())
                .await
                .map_err(std::io::Error::other)??;
        }
        Ok(())
    }
}
