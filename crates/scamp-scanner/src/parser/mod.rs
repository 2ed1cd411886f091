//! Flattening of nested hardware reports into devices and edges
//!
//! Each subsystem report is walked independently. A report that is missing or
//! does not have the expected shape contributes no devices; the parse as a
//! whole never fails.

mod displays;
mod network;
mod thunderbolt;
mod usb;

use scamp_core::{ConnectionType, DeviceType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::profiler::{ProfilerData, Subsystem};

pub use displays::classify_display_link;
pub use network::is_interface_active;

/// Detection ID of the synthetic root device
pub const ROOT_DETECTION_ID: &str = "computer";

/// Device classification assigned by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    Computer,
    Hub,
    UsbDevice,
    ThunderboltDevice,
    Display,
    NetworkDevice,
    Adapter,
}

impl From<DeviceKind> for DeviceType {
    fn from(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Computer => DeviceType::Computer,
            DeviceKind::Hub => DeviceType::Hub,
            DeviceKind::UsbDevice => DeviceType::UsbDevice,
            DeviceKind::ThunderboltDevice => DeviceType::ThunderboltDevice,
            DeviceKind::Display => DeviceType::Display,
            DeviceKind::NetworkDevice => DeviceType::NetworkDevice,
            DeviceKind::Adapter => DeviceType::Adapter,
        }
    }
}

/// Physical link kind between a parent and a discovered child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Usb,
    Thunderbolt,
    Ethernet,
    DisplayPort,
    Hdmi,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Usb => "usb",
            EdgeKind::Thunderbolt => "thunderbolt",
            EdgeKind::Ethernet => "ethernet",
            EdgeKind::DisplayPort => "displayport",
            EdgeKind::Hdmi => "hdmi",
        }
    }

    pub fn connection_type(&self) -> ConnectionType {
        ConnectionType::lookup(self.as_str())
    }
}

/// A device found in a hardware report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDevice {
    pub detection_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Hops from the root; the root itself is 0
    pub depth: u32,
}

/// Parent → child link discovered alongside the child device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

/// Flat result of parsing all subsystem reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedScan {
    pub devices: Vec<ParsedDevice>,
    pub edges: Vec<ParsedEdge>,
}

impl ParsedScan {
    fn with_root(root_label: &str) -> Self {
        Self {
            devices: vec![ParsedDevice {
                detection_id: ROOT_DETECTION_ID.to_string(),
                name: root_label.to_string(),
                kind: DeviceKind::Computer,
                metadata: Map::new(),
                depth: 0,
            }],
            edges: Vec::new(),
        }
    }

    fn push_child(&mut self, parent: &str, device: ParsedDevice, link: EdgeKind) {
        self.edges.push(ParsedEdge {
            source: parent.to_string(),
            target: device.detection_id.clone(),
            kind: link,
        });
        self.devices.push(device);
    }

    pub fn device(&self, detection_id: &str) -> Option<&ParsedDevice> {
        self.devices.iter().find(|d| d.detection_id == detection_id)
    }

    pub fn devices_of(&self, kind: DeviceKind) -> impl Iterator<Item = &ParsedDevice> {
        self.devices.iter().filter(move |d| d.kind == kind)
    }
}

/// Parse every available subsystem report. The root device is always first.
pub fn parse_profiler_data(data: &ProfilerData, root_label: &str) -> ParsedScan {
    let mut scan = ParsedScan::with_root(root_label);

    for subsystem in Subsystem::ALL {
        let Some(report) = data.get(subsystem) else {
            debug!(subsystem = %subsystem, "No report available, skipping");
            continue;
        };
        match subsystem {
            Subsystem::Usb => usb::parse(report, &mut scan),
            Subsystem::Thunderbolt => thunderbolt::parse(report, &mut scan),
            Subsystem::Displays => displays::parse(report, &mut scan),
            Subsystem::Network => network::parse(report, &mut scan),
        }
    }

    info!(
        devices = scan.devices.len() - 1,
        connections = scan.edges.len(),
        "Parsed hardware reports"
    );
    scan
}

/// Build a detection ID from identifying attributes.
///
/// Empty parts are dropped, the rest joined with `-`; anything other than
/// ASCII alphanumerics and `-` is removed and the result lowercased.
pub fn detection_id(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Text value of a report field; numbers are rendered, empty strings are absent
fn text(entry: &Map<String, Value>, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The list stored under `key`, if the report has one
fn list<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// Copy the named raw fields that are present into a metadata map
fn metadata(entry: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| match entry.get(*key) {
            None | Some(Value::Null) => None,
            Some(v) => Some((key.to_string(), v.clone())),
        })
        .collect()
}
