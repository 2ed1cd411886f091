//! USB bus tree walk

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{detection_id, list, metadata, text, DeviceKind, EdgeKind, ParsedDevice, ParsedScan, ROOT_DETECTION_ID};

/// Name system_profiler gives to bare USB controller nodes
const CONTROLLER_STUB_NAME: &str = "hub_device";

/// View over one entry of the USB tree
struct UsbNode<'a> {
    entry: &'a Map<String, Value>,
    name: String,
    children: &'a [Value],
}

impl<'a> UsbNode<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        let entry = value.as_object()?;
        Some(Self {
            entry,
            name: text(entry, "_name").unwrap_or_else(|| "Unknown USB Device".to_string()),
            children: list(value, "_items").unwrap_or_default(),
        })
    }

    fn is_hub(&self) -> bool {
        !self.children.is_empty()
    }

    /// Controller stubs carry no device of their own
    fn is_controller_stub(&self) -> bool {
        self.name.eq_ignore_ascii_case(CONTROLLER_STUB_NAME)
    }

    fn detection_id(&self) -> String {
        let vendor = text(self.entry, "vendor_id");
        let product = text(self.entry, "product_id");
        let location = text(self.entry, "location_id");
        detection_id(&[
            Some("usb"),
            Some(&self.name),
            vendor.as_deref(),
            product.as_deref(),
            location.as_deref(),
        ])
    }
}

/// Depth-first walk state: every emitted device is appended to `scan`
struct UsbWalk<'s> {
    scan: &'s mut ParsedScan,
}

impl UsbWalk<'_> {
    /// Walk `items`, attaching each emitted node to `parent_id` one level
    /// below `parent_depth`
    fn descend(&mut self, items: &[Value], parent_id: &str, parent_depth: u32) {
        for item in items {
            let Some(node) = UsbNode::from_value(item) else {
                debug!("Skipping non-object USB entry");
                continue;
            };

            if node.is_controller_stub() {
                // Children move up to the stub's parent at the stub's own level
                debug!(children = node.children.len(), "Eliding USB controller stub");
                self.descend(node.children, parent_id, parent_depth);
                continue;
            }

            let detection_id = node.detection_id();
            let kind = if node.is_hub() {
                DeviceKind::Hub
            } else {
                DeviceKind::UsbDevice
            };

            self.scan.push_child(
                parent_id,
                ParsedDevice {
                    detection_id: detection_id.clone(),
                    name: node.name.clone(),
                    kind,
                    metadata: metadata(node.entry, &["vendor_id", "product_id", "location_id", "serial_num"]),
                    depth: parent_depth + 1,
                },
                EdgeKind::Usb,
            );

            self.descend(node.children, &detection_id, parent_depth + 1);
        }
    }
}

pub(super) fn parse(report: &Value, scan: &mut ParsedScan) {
    let Some(buses) = list(report, "SPUSBDataType") else {
        warn!("USB report has no SPUSBDataType list, skipping");
        return;
    };

    let mut walk = UsbWalk { scan };
    for bus in buses {
        if let Some(items) = list(bus, "_items") {
            walk.descend(items, ROOT_DETECTION_ID, 0);
        }
    }
}
