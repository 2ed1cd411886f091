//! Display list

use serde_json::Value;
use tracing::{debug, warn};

use super::{detection_id, list, metadata, text, DeviceKind, EdgeKind, ParsedDevice, ParsedScan, ROOT_DETECTION_ID};

/// Classify the link a display is attached by from its reported connector.
///
/// HDMI wins over DisplayPort, which wins over Thunderbolt; anything
/// unrecognized is treated as DisplayPort.
pub fn classify_display_link(connector: &str) -> EdgeKind {
    let connector = connector.to_lowercase();
    if connector.contains("hdmi") {
        EdgeKind::Hdmi
    } else if connector.contains("displayport") || connector.contains("dp") {
        EdgeKind::DisplayPort
    } else if connector.contains("thunderbolt") {
        EdgeKind::Thunderbolt
    } else {
        EdgeKind::DisplayPort
    }
}

pub(super) fn parse(report: &Value, scan: &mut ParsedScan) {
    let Some(groups) = list(report, "SPDisplaysDataType") else {
        warn!("Display report has no SPDisplaysDataType list, skipping");
        return;
    };

    for group in groups {
        let Some(displays) = list(group, "spdisplays_ndrvs") else {
            debug!("Skipping display group without attached displays");
            continue;
        };

        for display in displays {
            let Some(display) = display.as_object() else {
                debug!("Skipping non-object display entry");
                continue;
            };
            let name = text(display, "_name").unwrap_or_else(|| "Unknown Display".to_string());
            let display_id = text(display, "_spdisplays_displayID").or_else(|| text(display, "_spdisplays_display_id"));
            let vendor = text(display, "_spdisplays_display-vendor-id");
            let product = text(display, "_spdisplays_display-product-id");
            let detection_id = detection_id(&[
                Some("display"),
                Some(&name),
                vendor.as_deref(),
                product.as_deref(),
                display_id.as_deref(),
            ]);

            let connector = text(display, "spdisplays_connection_type").unwrap_or_default();
            let link = classify_display_link(&connector);

            let mut meta = metadata(display, &["_spdisplays_resolution"]);
            if let Some(resolution) = meta.remove("_spdisplays_resolution") {
                meta.insert("resolution".to_string(), resolution);
            }
            meta.insert("connection_type".to_string(), Value::String(connector));

            scan.push_child(
                ROOT_DETECTION_ID,
                ParsedDevice {
                    detection_id,
                    name,
                    kind: DeviceKind::Display,
                    metadata: meta,
                    depth: 1,
                },
                link,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connector_classification() {
        assert_eq!(classify_display_link("HDMI-Alike"), EdgeKind::Hdmi);
        assert_eq!(classify_display_link("spdisplays_displayport_dp"), EdgeKind::DisplayPort);
        assert_eq!(classify_display_link("DP"), EdgeKind::DisplayPort);
        assert_eq!(classify_display_link("Thunderbolt"), EdgeKind::Thunderbolt);
        assert_eq!(classify_display_link("internal"), EdgeKind::DisplayPort);
        assert_eq!(classify_display_link(""), EdgeKind::DisplayPort);
    }

    #[test]
    fn test_hdmi_beats_displayport() {
        assert_eq!(classify_display_link("DisplayPort over HDMI"), EdgeKind::Hdmi);
    }

    #[test]
    fn test_displays_are_depth_one() {
        let mut scan = ParsedScan::with_root("Mac");
        parse(
            &json!({
                "SPDisplaysDataType": [
                    { "_name": "Apple M2 Max" },
                    {
                        "_name": "GPU",
                        "spdisplays_ndrvs": [
                            {
                                "_name": "LG UltraFine",
                                "_spdisplays_displayID": "2",
                                "_spdisplays_display-vendor-id": "1e6d",
                                "_spdisplays_resolution": "3840 x 2160",
                                "spdisplays_connection_type": "HDMI-Alike"
                            },
                            { "spdisplays_connection_type": "Thunderbolt" }
                        ]
                    }
                ]
            }),
            &mut scan,
        );

        assert_eq!(scan.devices.len(), 3);
        let lg = &scan.devices[1];
        assert_eq!(lg.detection_id, "display-lgultrafine-1e6d-2");
        assert_eq!(lg.depth, 1);
        assert_eq!(lg.metadata["resolution"], "3840 x 2160");
        assert_eq!(lg.metadata["connection_type"], "HDMI-Alike");
        assert_eq!(scan.edges[0].kind, EdgeKind::Hdmi);

        assert_eq!(scan.devices[2].name, "Unknown Display");
        assert_eq!(scan.edges[1].kind, EdgeKind::Thunderbolt);
    }
}
