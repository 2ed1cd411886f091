//! Network interface list
//!
//! Only wired, currently connected interfaces are kept. Bridges and the
//! generic `Ethernet Adapter (enN)` entries macOS reports for virtual
//! interfaces are dropped.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::{detection_id, list, metadata, text, DeviceKind, EdgeKind, ParsedDevice, ParsedScan, ROOT_DETECTION_ID};

static VIRTUAL_ADAPTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Ethernet Adapter \(en\d+\)$").expect("static regex"));

/// Whether an interface has a link: an assigned IPv4 address or an Ethernet
/// media subtype other than `none`
pub fn is_interface_active(interface: &Map<String, Value>) -> bool {
    let has_address = interface
        .get("IPv4")
        .and_then(|ipv4| ipv4.get("Addresses"))
        .and_then(Value::as_array)
        .is_some_and(|addrs| !addrs.is_empty());
    if has_address {
        return true;
    }

    interface
        .get("Ethernet")
        .and_then(|eth| eth.get("MediaSubType"))
        .and_then(Value::as_str)
        .is_some_and(|media| !media.is_empty() && media != "none")
}

fn is_ethernet_like(name: &str, interface_type: &str) -> bool {
    let name = name.to_lowercase();
    interface_type.to_lowercase().contains("ethernet") || name.contains("ethernet") || name.contains("lan")
}

fn is_usb_backed(interface: &Map<String, Value>) -> bool {
    interface
        .get("USB")
        .and_then(Value::as_str)
        .is_some_and(|usb| usb.to_lowercase().contains("yes"))
}

pub(super) fn parse(report: &Value, scan: &mut ParsedScan) {
    let Some(interfaces) = list(report, "SPNetworkDataType") else {
        warn!("Network report has no SPNetworkDataType list, skipping");
        return;
    };

    for interface in interfaces {
        let Some(interface) = interface.as_object() else {
            debug!("Skipping non-object network entry");
            continue;
        };
        let bsd_name = text(interface, "interface");
        let name = text(interface, "_name")
            .or_else(|| bsd_name.clone())
            .unwrap_or_else(|| "Unknown Network Device".to_string());
        let interface_type = text(interface, "type").unwrap_or_default();

        let is_bridge = name.to_lowercase().contains("bridge")
            || bsd_name.as_deref().is_some_and(|b| b.to_lowercase().contains("bridge"));
        if is_bridge {
            debug!(name = %name, "Skipping bridge interface");
            continue;
        }
        if VIRTUAL_ADAPTER.is_match(&name) {
            debug!(name = %name, "Skipping virtual adapter");
            continue;
        }
        if !is_ethernet_like(&name, &interface_type) || !is_interface_active(interface) {
            debug!(name = %name, "Skipping inactive or non-wired interface");
            continue;
        }

        let vendor = text(interface, "vendor_id");
        let product = text(interface, "product_id");
        let detection_id = detection_id(&[
            Some("net"),
            Some(&name),
            vendor.as_deref(),
            product.as_deref(),
            bsd_name.as_deref(),
        ]);

        let (kind, link) = if is_usb_backed(interface) {
            (DeviceKind::Adapter, EdgeKind::Usb)
        } else {
            (DeviceKind::NetworkDevice, EdgeKind::Ethernet)
        };

        scan.push_child(
            ROOT_DETECTION_ID,
            ParsedDevice {
                detection_id,
                name,
                kind,
                metadata: metadata(interface, &["interface", "type", "hardware"]),
                depth: 1,
            },
            link,
        );
    }
}
