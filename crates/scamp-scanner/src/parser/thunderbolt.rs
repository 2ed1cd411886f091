//! Thunderbolt controller list

use serde_json::Value;
use tracing::{debug, warn};

use super::{detection_id, list, metadata, text, DeviceKind, EdgeKind, ParsedDevice, ParsedScan, ROOT_DETECTION_ID};

/// Placeholder name for the host's own bus entries
const BUS_PLACEHOLDER: &str = "Thunderbolt Bus";

pub(super) fn parse(report: &Value, scan: &mut ParsedScan) {
    let Some(controllers) = list(report, "SPThunderboltDataType") else {
        warn!("Thunderbolt report has no SPThunderboltDataType list, skipping");
        return;
    };

    for controller in controllers {
        let Some(controller) = controller.as_object() else {
            debug!("Skipping non-object Thunderbolt entry");
            continue;
        };
        let Some(name) = text(controller, "device_name") else {
            debug!("Skipping unnamed Thunderbolt entry");
            continue;
        };
        if name == BUS_PLACEHOLDER {
            debug!("Skipping Thunderbolt bus entry");
            continue;
        }

        let vendor = text(controller, "vendor_id");
        let device = text(controller, "device_id");
        let detection_id = detection_id(&[Some("tb"), Some(&name), vendor.as_deref(), device.as_deref()]);

        scan.push_child(
            ROOT_DETECTION_ID,
            ParsedDevice {
                detection_id,
                name,
                kind: DeviceKind::ThunderboltDevice,
                metadata: metadata(controller, &["vendor_id", "device_id", "port_type"]),
                depth: 1,
            },
            EdgeKind::Thunderbolt,
        );
    }
}
