//! Mapping parsed devices and edges onto a topology document

use scamp_core::{Connection, ConnectionType, Device, DeviceType, Port, Position, Topology};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::parser::{ParsedEdge, ParsedScan};

/// Which end of a connection a device sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Source,
    Target,
}

/// Why an edge did not make it into the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// An endpoint's detection ID has no device
    UnknownDevice(String),
    /// An endpoint device has no port to attach to
    NoPort(String),
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::UnknownDevice(id) => write!(f, "unknown device {}", id),
            DropReason::NoPort(label) => write!(f, "no usable port on {}", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedConnection {
    pub edge: ParsedEdge,
    pub reason: DropReason,
}

/// Result of mapping: the document plus anything that had to be left out
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub topology: Topology,
    pub dropped: Vec<DroppedConnection>,
}

/// Pick the port a connection of type `connection_type` should use on
/// `device`.
///
/// Hubs receive on their upstream port and send from the downstream ones.
/// Everything else takes the first port of the matching type, or the first
/// port at all.
pub fn find_matching_port<'a>(device: &'a Device, connection_type: &ConnectionType, role: PortRole) -> Option<&'a Port> {
    let first = device.ports.first()?;

    if device.device_type == DeviceType::Hub {
        return Some(match role {
            PortRole::Target => device.ports.iter().find(|p| p.is_upstream()).unwrap_or(first),
            PortRole::Source => {
                let mut downstream = device.ports.iter().filter(|p| !p.is_upstream()).peekable();
                let first_downstream = downstream.peek().copied();
                downstream
                    .find(|p| &p.port_type == connection_type)
                    .or(first_downstream)
                    .unwrap_or(first)
            }
        });
    }

    Some(
        device
            .ports
            .iter()
            .find(|p| &p.port_type == connection_type)
            .unwrap_or(first),
    )
}

/// Build the topology document for a parsed scan.
///
/// Devices without a computed position are placed at the origin. Edges whose
/// endpoints or ports cannot be resolved are dropped with a warning.
pub fn map_to_topology(scan: &ParsedScan, positions: &HashMap<String, Position>, name: &str) -> MapOutcome {
    let mut topology = Topology::new(name);

    // detection ID -> index into topology.devices
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(scan.devices.len());

    for parsed in &scan.devices {
        let position = positions
            .get(&parsed.detection_id)
            .copied()
            .unwrap_or(Position::ORIGIN);

        let device = Device::new(parsed.kind.into(), parsed.name.as_str())
            .with_detection_id(parsed.detection_id.as_str())
            .with_position(position);

        index.insert(parsed.detection_id.as_str(), topology.devices.len());
        topology.add_device(device);
    }

    let dropped = connect_edges(&mut topology, &index, &scan.edges);

    debug!(
        devices = topology.devices.len(),
        connections = topology.connections.len(),
        dropped = dropped.len(),
        "Mapped scan to topology"
    );

    MapOutcome { topology, dropped }
}

/// Add a connection per edge, returning the edges that could not be placed
fn connect_edges(topology: &mut Topology, index: &HashMap<&str, usize>, edges: &[ParsedEdge]) -> Vec<DroppedConnection> {
    let mut dropped = Vec::new();
    for edge in edges {
        match resolve_edge(topology, index, edge) {
            Ok(connection) => topology.add_connection(connection),
            Err(reason) => {
                warn!(
                    source = %edge.source,
                    target = %edge.target,
                    "Could not create connection: {}",
                    reason
                );
                dropped.push(DroppedConnection {
                    edge: edge.clone(),
                    reason,
                });
            }
        }
    }
    dropped
}

fn resolve_edge(topology: &Topology, index: &HashMap<&str, usize>, edge: &ParsedEdge) -> Result<Connection, DropReason> {
    let lookup = |detection_id: &str| {
        index
            .get(detection_id)
            .map(|&i| &topology.devices[i])
            .ok_or_else(|| DropReason::UnknownDevice(detection_id.to_string()))
    };
    let source = lookup(&edge.source)?;
    let target = lookup(&edge.target)?;

    let connection_type = edge.kind.connection_type();
    let source_port = find_matching_port(source, &connection_type, PortRole::Source)
        .ok_or_else(|| DropReason::NoPort(source.label.clone()))?;
    let target_port = find_matching_port(target, &connection_type, PortRole::Target)
        .ok_or_else(|| DropReason::NoPort(target.label.clone()))?;

    Ok(Connection::new(
        source.id.clone(),
        source_port.id.as_str(),
        target.id.clone(),
        target_port.id.as_str(),
        connection_type,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DeviceKind, EdgeKind, ParsedDevice};
    use scamp_core::{PortDirection, PortPosition};
    use serde_json::Map;

    fn parsed(id: &str, kind: DeviceKind, depth: u32) -> ParsedDevice {
        ParsedDevice {
            detection_id: id.to_string(),
            name: id.to_string(),
            kind,
            metadata: Map::new(),
            depth,
        }
    }

    fn edge(source: &str, target: &str, kind: EdgeKind) -> ParsedEdge {
        ParsedEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
        }
    }

    fn port(id: &str, label: &str, ty: ConnectionType) -> Port {
        Port {
            id: id.to_string(),
            label: label.to_string(),
            port_type: ty,
            position: PortPosition::Right,
            direction: PortDirection::Bidirectional,
        }
    }

    #[test]
    fn test_hub_target_uses_upstream() {
        let hub = Device::new(DeviceType::Hub, "Hub");
        let port = find_matching_port(&hub, &ConnectionType::Usb, PortRole::Target).unwrap();
        assert_eq!(port.id, "upstream");
    }

    #[test]
    fn test_hub_target_upstream_by_label() {
        let hub = Device::new(DeviceType::Hub, "Hub").with_ports(vec![
            port("a", "USB 1", ConnectionType::Usb),
            port("b", "Upstream (USB-C)", ConnectionType::Usb),
        ]);
        let port = find_matching_port(&hub, &ConnectionType::Usb, PortRole::Target).unwrap();
        assert_eq!(port.id, "b");
    }

    #[test]
    fn test_hub_target_without_upstream_takes_first() {
        let hub = Device::new(DeviceType::Hub, "Hub").with_ports(vec![
            port("a", "USB 1", ConnectionType::Usb),
            port("b", "USB 2", ConnectionType::Usb),
        ]);
        let port = find_matching_port(&hub, &ConnectionType::Usb, PortRole::Target).unwrap();
        assert_eq!(port.id, "a");
    }

    #[test]
    fn test_hub_source_prefers_matching_downstream() {
        let hub = Device::new(DeviceType::Hub, "Hub").with_ports(vec![
            port("upstream", "Upstream", ConnectionType::Usb),
            port("tb", "TB", ConnectionType::Thunderbolt),
            port("eth", "LAN", ConnectionType::Ethernet),
        ]);
        let port = find_matching_port(&hub, &ConnectionType::Ethernet, PortRole::Source).unwrap();
        assert_eq!(port.id, "eth");

        let port = find_matching_port(&hub, &ConnectionType::Hdmi, PortRole::Source).unwrap();
        assert_eq!(port.id, "tb");
    }

    #[test]
    fn test_hub_source_with_only_upstream_falls_back() {
        let hub = Device::new(DeviceType::Hub, "Hub")
            .with_ports(vec![port("upstream", "Upstream", ConnectionType::Usb)]);
        let port = find_matching_port(&hub, &ConnectionType::Usb, PortRole::Source).unwrap();
        assert_eq!(port.id, "upstream");
    }

    #[test]
    fn test_non_hub_type_match_then_first() {
        let mac = Device::new(DeviceType::Computer, "Mac");
        let usb = find_matching_port(&mac, &ConnectionType::Usb, PortRole::Source).unwrap();
        assert_eq!(usb.id, "usb-c-1");
        let hdmi = find_matching_port(&mac, &ConnectionType::Hdmi, PortRole::Source).unwrap();
        assert_eq!(hdmi.id, "thunderbolt-1");
    }

    #[test]
    fn test_no_ports_no_match() {
        let lamp = Device::new(DeviceType::Other, "Lamp");
        assert!(find_matching_port(&lamp, &ConnectionType::Usb, PortRole::Target).is_none());
    }

    #[test]
    fn test_map_scan() {
        let scan = ParsedScan {
            devices: vec![
                parsed("computer", DeviceKind::Computer, 0),
                parsed("usb-hub", DeviceKind::Hub, 1),
                parsed("usb-mouse", DeviceKind::UsbDevice, 2),
            ],
            edges: vec![
                edge("computer", "usb-hub", EdgeKind::Usb),
                edge("usb-hub", "usb-mouse", EdgeKind::Usb),
            ],
        };
        let mut positions = HashMap::new();
        positions.insert("usb-hub".to_string(), Position::new(0.0, -300.0));

        let outcome = map_to_topology(&scan, &positions, "Desk");
        let topology = &outcome.topology;
        assert!(outcome.dropped.is_empty());
        assert_eq!(topology.name, "Desk");
        assert_eq!(topology.devices.len(), 3);
        assert_eq!(topology.connections.len(), 2);

        let hub = topology.device_by_detection_id("usb-hub").unwrap();
        assert_eq!(hub.device_type, DeviceType::Hub);
        assert_eq!(hub.position, Position::new(0.0, -300.0));
        // no layout entry
        let mouse = topology.device_by_detection_id("usb-mouse").unwrap();
        assert_eq!(mouse.position, Position::ORIGIN);

        let first = &topology.connections[0];
        assert_eq!(first.source_port, "usb-c-1");
        assert_eq!(first.target_port, "upstream");
        let second = &topology.connections[1];
        assert_eq!(second.source, hub.id);
        assert_eq!(second.source_port, "usb-1");
        assert_eq!(second.target, mouse.id);
        assert_eq!(second.target_port, "usb");
        assert_eq!(second.connection_type, ConnectionType::Usb);

        assert!(topology.validate().unwrap().valid);
    }

    #[test]
    fn test_unresolved_edge_is_dropped() {
        let scan = ParsedScan {
            devices: vec![parsed("computer", DeviceKind::Computer, 0)],
            edges: vec![edge("computer", "usb-ghost", EdgeKind::Usb)],
        };
        let outcome = map_to_topology(&scan, &HashMap::new(), "Desk");
        assert!(outcome.topology.connections.is_empty());
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].reason, DropReason::UnknownDevice("usb-ghost".to_string()));
    }

    #[test]
    fn test_portless_endpoint_is_dropped() {
        let mut topology = Topology::new("Desk");
        topology.add_device(Device::new(DeviceType::Computer, "Mac").with_detection_id("computer"));
        topology.add_device(Device::new(DeviceType::Hub, "Dock").with_detection_id("dock"));
        topology.add_device(Device::new(DeviceType::Other, "Desk Lamp").with_detection_id("lamp"));
        let index: HashMap<&str, usize> = [("computer", 0), ("dock", 1), ("lamp", 2)].into_iter().collect();

        let edges = [
            edge("computer", "dock", EdgeKind::Usb),
            edge("dock", "lamp", EdgeKind::Usb),
            edge("lamp", "computer", EdgeKind::Usb),
        ];
        let dropped = connect_edges(&mut topology, &index, &edges);

        assert_eq!(topology.connections.len(), 1);
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].edge, edges[1]);
        assert_eq!(dropped[0].reason, DropReason::NoPort("Desk Lamp".to_string()));
        assert_eq!(dropped[1].edge, edges[2]);
        assert_eq!(dropped[1].reason, DropReason::NoPort("Desk Lamp".to_string()));
    }

    #[test]
    fn test_display_link_uses_typed_ports() {
        let scan = ParsedScan {
            devices: vec![
                parsed("computer", DeviceKind::Computer, 0),
                parsed("display-lg", DeviceKind::Display, 1),
            ],
            edges: vec![edge("computer", "display-lg", EdgeKind::Hdmi)],
        };
        let outcome = map_to_topology(&scan, &HashMap::new(), "Desk");
        let conn = &outcome.topology.connections[0];
        assert_eq!(conn.connection_type, ConnectionType::Hdmi);
        // neither side has an HDMI port, so both fall back to their first
        assert_eq!(conn.source_port, "thunderbolt-1");
        assert_eq!(conn.target_port, "upstream");
    }
}
