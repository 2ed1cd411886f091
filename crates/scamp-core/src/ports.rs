//! Default port sets per device type

use crate::connection::ConnectionType;
use crate::device::{DeviceType, Port, PortDirection, PortPosition};

use ConnectionType::{Ethernet, Thunderbolt, Usb};
use PortDirection::{Bidirectional, In, Out};
use PortPosition::{Bottom, Left, Right, Top};

type PortSpec = (&'static str, &'static str, ConnectionType, PortPosition, PortDirection);

static COMPUTER: [PortSpec; 5] = [
    ("thunderbolt-1", "TB1", Thunderbolt, Left, Bidirectional),
    ("thunderbolt-2", "TB2", Thunderbolt, Left, Bidirectional),
    ("thunderbolt-3", "TB3", Thunderbolt, Left, Bidirectional),
    ("usb-c-1", "USB-C 1", Usb, Right, Bidirectional),
    ("usb-c-2", "USB-C 2", Usb, Right, Bidirectional),
];

static HUB: [PortSpec; 5] = [
    ("upstream", "Upstream", Usb, Left, In),
    ("usb-1", "USB 1", Usb, Right, Out),
    ("usb-2", "USB 2", Usb, Right, Out),
    ("usb-3", "USB 3", Usb, Right, Out),
    ("usb-4", "USB 4", Usb, Right, Out),
];

static DISPLAY: [PortSpec; 2] = [
    ("upstream", "Input", Thunderbolt, Top, In),
    ("downstream", "Output", Thunderbolt, Bottom, Out),
];

static USB_DEVICE: [PortSpec; 1] = [("usb", "USB", Usb, Left, In)];

static NETWORK_DEVICE: [PortSpec; 2] = [
    ("usb", "USB", Usb, Left, In),
    ("ethernet", "Ethernet", Ethernet, Right, Bidirectional),
];

static THUNDERBOLT_DEVICE: [PortSpec; 1] = [("thunderbolt", "TB", Thunderbolt, Left, Bidirectional)];

static ADAPTER: [PortSpec; 2] = [
    ("input", "In", Usb, Left, In),
    ("output", "Out", Ethernet, Right, Out),
];

static NONE: [PortSpec; 0] = [];

fn port_specs(device_type: DeviceType) -> &'static [PortSpec] {
    match device_type {
        DeviceType::Computer => &COMPUTER,
        DeviceType::Hub => &HUB,
        DeviceType::Display => &DISPLAY,
        DeviceType::UsbDevice => &USB_DEVICE,
        DeviceType::NetworkDevice => &NETWORK_DEVICE,
        DeviceType::ThunderboltDevice => &THUNDERBOLT_DEVICE,
        DeviceType::Adapter => &ADAPTER,
        DeviceType::Other => &NONE,
    }
}

/// Fresh copy of the default ports for a device type. `Other` has none.
pub fn default_ports(device_type: DeviceType) -> Vec<Port> {
    port_specs(device_type)
        .iter()
        .map(|(id, label, port_type, position, direction)| Port {
            id: id.to_string(),
            label: label.to_string(),
            port_type: port_type.clone(),
            position: *position,
            direction: *direction,
        })
        .collect()
}
