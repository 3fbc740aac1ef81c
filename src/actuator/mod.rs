pub mod session;
pub mod transport;
pub mod serial;

pub use session::{ActuatorCommand, ActuatorSession, LinkState};
pub use transport::{ActuatorTransport, PortInfo, TransportHandle};
pub use serial::SerialTransport;
