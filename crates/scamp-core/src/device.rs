//! Device types for the canonical topology document

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::connection::ConnectionType;
use crate::ports::default_ports;

/// Opaque identifier for a device within one topology document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Generate a fresh device ID
    pub fn generate() -> Self {
        Self(format!("device-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of device shown on the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    Computer,
    Hub,
    Display,
    UsbDevice,
    NetworkDevice,
    ThunderboltDevice,
    Adapter,
    Other,
}

impl DeviceType {
    pub const ALL: [DeviceType; 8] = [
        DeviceType::Computer,
        DeviceType::Hub,
        DeviceType::Display,
        DeviceType::UsbDevice,
        DeviceType::NetworkDevice,
        DeviceType::ThunderboltDevice,
        DeviceType::Adapter,
        DeviceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Computer => "computer",
            DeviceType::Hub => "hub",
            DeviceType::Display => "display",
            DeviceType::UsbDevice => "usb-device",
            DeviceType::NetworkDevice => "network-device",
            DeviceType::ThunderboltDevice => "thunderbolt-device",
            DeviceType::Adapter => "adapter",
            DeviceType::Other => "other",
        }
    }

    /// Look up a device type by its serialized name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two diagram groupings a device belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Canvas {
    #[default]
    Current,
    Target,
}

/// 2-D diagram coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the origin
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Side of the device node a port is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortPosition {
    Left,
    Right,
    Top,
    Bottom,
}

/// Whether a port can act as a connection source, target, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// Target only
    In,
    /// Source only
    Out,
    #[default]
    Bidirectional,
}

/// A connector on a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub port_type: ConnectionType,
    pub position: PortPosition,
    #[serde(default)]
    pub direction: PortDirection,
}

impl Port {
    /// Create a user-added port with a generated ID
    pub fn new(
        label: impl Into<String>,
        port_type: ConnectionType,
        position: PortPosition,
        direction: PortDirection,
    ) -> Self {
        Self {
            id: format!("port-{}", Uuid::new_v4().simple()),
            label: label.into(),
            port_type,
            position,
            direction,
        }
    }

    /// Upstream ports face the host; hubs never route downstream traffic through them
    pub fn is_upstream(&self) -> bool {
        self.id == "upstream" || self.label.to_lowercase().contains("upstream")
    }
}

/// A device on the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub label: String,
    /// Identity assigned by the scanner, stable across scans
    pub detection_id: Option<String>,
    pub position: Position,
    pub canvas: Canvas,
    pub ports: Vec<Port>,
}

impl Device {
    /// Create a device with the default port set for its type
    pub fn new(device_type: DeviceType, label: impl Into<String>) -> Self {
        Self {
            id: DeviceId::generate(),
            device_type,
            label: label.into(),
            detection_id: None,
            position: Position::ORIGIN,
            canvas: Canvas::Current,
            ports: default_ports(device_type),
        }
    }

    pub fn with_detection_id(mut self, detection_id: impl Into<String>) -> Self {
        self.detection_id = Some(detection_id.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Replace the default ports
    pub fn with_ports(mut self, ports: Vec<Port>) -> Self {
        self.ports = ports;
        self
    }

    pub fn port(&self, id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }
}
