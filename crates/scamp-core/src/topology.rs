//! Topology document: devices, connections, and the connection-type registry

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::connection::{default_connection_types, Connection, ConnectionType, ConnectionTypeDef};
use crate::device::{Device, DeviceId};
use crate::validate::{SchemaValidator, TopologyValidator, ValidationReport};

/// Current topology file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Failed to parse topology JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid topology: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

/// A complete topology document as exchanged with the diagram editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default = "default_connection_types")]
    pub connection_types: Vec<ConnectionTypeDef>,
}

impl Topology {
    /// Create an empty document carrying the built-in connection types
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            name: name.into(),
            devices: Vec::new(),
            connections: Vec::new(),
            connection_types: default_connection_types(),
        }
    }

    pub fn add_device(&mut self, device: Device) -> DeviceId {
        let id = device.id.clone();
        self.devices.push(device);
        id
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Register a user-defined connection type and return its type handle
    pub fn add_connection_type(&mut self, name: &str, color: Option<&str>) -> ConnectionType {
        let def = ConnectionTypeDef::custom(name, color);
        let ty = ConnectionType::Custom(def.id.clone());
        self.connection_types.push(def);
        ty
    }

    /// Whether a connection type is usable in this document
    pub fn has_connection_type(&self, ty: &ConnectionType) -> bool {
        ty.is_builtin() || self.connection_types.iter().any(|d| d.id == ty.as_str())
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn device_by_detection_id(&self, detection_id: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.detection_id.as_deref() == Some(detection_id))
    }

    /// Run a validator over the serialized form of this document
    pub fn validate_with(&self, validator: &dyn TopologyValidator) -> Result<ValidationReport, TopologyError> {
        let value = serde_json::to_value(self)?;
        Ok(validator.validate(&value))
    }

    pub fn validate(&self) -> Result<ValidationReport, TopologyError> {
        self.validate_with(&SchemaValidator)
    }

    /// Parse and validate a topology file's contents.
    ///
    /// Files written before custom connection types existed have no
    /// `connectionTypes`; the built-ins are filled in.
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        let mut value: Value = serde_json::from_str(json)?;
        if let Value::Object(map) = &mut value {
            if !map.contains_key("connectionTypes") {
                debug!("Topology has no connectionTypes, using built-ins");
                map.insert(
                    "connectionTypes".to_string(),
                    serde_json::to_value(default_connection_types())?,
                );
            }
        }

        let report = SchemaValidator.validate(&value);
        if !report.valid {
            return Err(TopologyError::Invalid(report.errors));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, TopologyError> {
        let content = std::fs::read_to_string(path)?;
        let topology = Self::from_json(&content)?;
        debug!(path = %path.display(), devices = topology.devices.len(), "Loaded topology");
        Ok(topology)
    }

    /// Pretty-printed JSON; refuses to serialize an invalid document
    pub fn to_json_pretty(&self) -> Result<String, TopologyError> {
        let report = self.validate()?;
        if !report.valid {
            return Err(TopologyError::Invalid(report.errors));
        }
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), TopologyError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Saved topology");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceType;
    use tempfile::TempDir;

    fn sample() -> Topology {
        let mut topology = Topology::new("Desk");
        let mac = topology.add_device(Device::new(DeviceType::Computer, "Mac").with_detection_id("computer"));
        let hub = topology.add_device(Device::new(DeviceType::Hub, "Hub"));
        topology.add_connection(Connection::new(mac, "usb-c-1", hub, "upstream", ConnectionType::Usb));
        topology
    }

    #[test]
    fn test_new_topology_is_empty() {
        let topology = Topology::new("Untitled Setup");
        assert_eq!(topology.version, "1.0");
        assert!(topology.devices.is_empty());
        assert!(topology.connections.is_empty());
        assert_eq!(topology.connection_types.len(), 5);
    }

    #[test]
    fn test_lookup_by_detection_id() {
        let topology = sample();
        let mac = topology.device_by_detection_id("computer").unwrap();
        assert_eq!(mac.label, "Mac");
        assert!(topology.device(&mac.id).is_some());
        assert!(topology.device_by_detection_id("usb-mouse").is_none());
    }

    #[test]
    fn test_custom_connection_type() {
        let mut topology = sample();
        let lightning = topology.add_connection_type("Lightning", Some("#ffffff"));
        assert!(topology.has_connection_type(&lightning));
        assert!(!topology.has_connection_type(&ConnectionType::Custom("ctype-missing".into())));
        assert!(topology.has_connection_type(&ConnectionType::Hdmi));
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let topology = sample();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("desk.json");
        topology.to_file(&path).unwrap();

        let loaded = Topology::from_file(&path).unwrap();
        assert_eq!(loaded, topology);
    }

    #[test]
    fn test_missing_connection_types_are_backfilled() {
        let json = r#"{
            "version": "1.0",
            "name": "Old file",
            "devices": [],
            "connections": []
        }"#;
        let topology = Topology::from_json(json).unwrap();
        assert_eq!(topology.connection_types, default_connection_types());
    }

    #[test]
    fn test_invalid_document_is_rejected() {
        let json = r#"{ "version": "1.0", "name": "", "devices": [], "connections": [] }"#;
        match Topology::from_json(json) {
            Err(TopologyError::Invalid(errors)) => {
                assert_eq!(errors, vec!["Missing or invalid name field".to_string()]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(matches!(Topology::from_json("not json"), Err(TopologyError::JsonError(_))));
    }

    #[test]
    fn test_invalid_document_is_not_serialized() {
        let mut topology = sample();
        topology.connections[0].target_port = "usb-9".to_string();
        assert!(matches!(topology.to_json_pretty(), Err(TopologyError::Invalid(_))));
    }
}
