//! Scamp Core - Topology document types, port registry, and validation
//!
//! This crate provides the foundational types shared by the scanner and the
//! diagram editor:
//! - Canonical devices, ports, and connections
//! - The connection-type registry and per-device-type default ports
//! - The topology document and its JSON file format
//! - Structural validation of topology documents

pub mod connection;
pub mod device;
pub mod ports;
pub mod topology;
pub mod validate;

pub use connection::{default_connection_types, Connection, ConnectionType, ConnectionTypeDef};
pub use device::{Canvas, Device, DeviceId, DeviceType, Port, PortDirection, PortPosition, Position};
pub use ports::default_ports;
pub use topology::{Topology, TopologyError, FILE_FORMAT_VERSION};
pub use validate::{SchemaValidator, TopologyValidator, ValidationReport};
