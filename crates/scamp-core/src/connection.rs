//! Connection types and the connection-type registry

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::device::DeviceId;

/// Physical link kind carried by a connection or accepted by a port
///
/// The five built-in kinds are fixed; documents may register additional
/// kinds, which are carried as `Custom` with their registry ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionType {
    Usb,
    Thunderbolt,
    Ethernet,
    DisplayPort,
    Hdmi,
    Custom(String),
}

impl ConnectionType {
    pub const BUILTIN: [ConnectionType; 5] = [
        ConnectionType::Usb,
        ConnectionType::Thunderbolt,
        ConnectionType::Ethernet,
        ConnectionType::DisplayPort,
        ConnectionType::Hdmi,
    ];

    pub const BUILTIN_IDS: [&'static str; 5] = ["usb", "thunderbolt", "ethernet", "displayport", "hdmi"];

    pub fn as_str(&self) -> &str {
        match self {
            ConnectionType::Usb => "usb",
            ConnectionType::Thunderbolt => "thunderbolt",
            ConnectionType::Ethernet => "ethernet",
            ConnectionType::DisplayPort => "displayport",
            ConnectionType::Hdmi => "hdmi",
            ConnectionType::Custom(id) => id,
        }
    }

    /// Map a scanner link name onto a built-in type.
    ///
    /// Unrecognized names fall back to USB.
    pub fn lookup(raw: &str) -> Self {
        Self::BUILTIN
            .into_iter()
            .find(|t| t.as_str() == raw)
            .unwrap_or(ConnectionType::Usb)
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, ConnectionType::Custom(_))
    }
}

impl From<String> for ConnectionType {
    fn from(id: String) -> Self {
        Self::BUILTIN
            .into_iter()
            .find(|t| t.as_str() == id)
            .unwrap_or(ConnectionType::Custom(id))
    }
}

impl From<&str> for ConnectionType {
    fn from(id: &str) -> Self {
        Self::from(id.to_string())
    }
}

impl From<ConnectionType> for String {
    fn from(ty: ConnectionType) -> Self {
        match ty {
            ConnectionType::Custom(id) => id,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry entry describing a connection type and its diagram color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTypeDef {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl ConnectionTypeDef {
    /// Create a user-defined connection type with a generated ID
    pub fn custom(name: impl Into<String>, color: Option<&str>) -> Self {
        Self {
            id: format!("ctype-{}", Uuid::new_v4().simple()),
            name: name.into(),
            color: color.unwrap_or("#888888").to_string(),
        }
    }
}

const BUILTIN_DEFS: [(&str, &str, &str); 5] = [
    ("usb", "USB", "#4169e1"),
    ("thunderbolt", "Thunderbolt", "#f4c430"),
    ("ethernet", "Ethernet", "#32cd32"),
    ("displayport", "DisplayPort", "#9370db"),
    ("hdmi", "HDMI", "#ff6347"),
];

/// The five built-in registry entries, in display order
pub fn default_connection_types() -> Vec<ConnectionTypeDef> {
    BUILTIN_DEFS
        .iter()
        .map(|(id, name, color)| ConnectionTypeDef {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
}

/// A link between two device ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source: DeviceId,
    pub target: DeviceId,
    pub source_port: String,
    pub target_port: String,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub label: String,
}

impl Connection {
    pub fn new(
        source: DeviceId,
        source_port: impl Into<String>,
        target: DeviceId,
        target_port: impl Into<String>,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            id: format!("conn-{}", Uuid::new_v4().simple()),
            source,
            target,
            source_port: source_port.into(),
            target_port: target_port.into(),
            connection_type,
            label: String::new(),
        }
    }
}
