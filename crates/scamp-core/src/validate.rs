//! Structural validation of topology documents
//!
//! Validation runs on the raw JSON value rather than the typed [`Topology`],
//! so files produced by other tools can be checked before deserializing.
//!
//! [`Topology`]: crate::topology::Topology

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::connection::ConnectionType;
use crate::device::DeviceType;

/// Outcome of validating a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Accepts or rejects a candidate topology document
pub trait TopologyValidator {
    fn validate(&self, document: &Value) -> ValidationReport;
}

/// Built-in structural validator for the topology file format
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl TopologyValidator for SchemaValidator {
    fn validate(&self, document: &Value) -> ValidationReport {
        let Some(doc) = document.as_object() else {
            return ValidationReport::from_errors(vec!["Topology is not an object".to_string()]);
        };

        let mut errors = Vec::new();

        if doc.get("version").map_or(true, Value::is_null) {
            errors.push("Missing version field".to_string());
        }
        if non_empty_str(doc, "name").is_none() {
            errors.push("Missing or invalid name field".to_string());
        }

        let Some(devices) = doc.get("devices").and_then(Value::as_array) else {
            errors.push("Missing or invalid devices array".to_string());
            return ValidationReport::from_errors(errors);
        };
        let Some(connections) = doc.get("connections").and_then(Value::as_array) else {
            errors.push("Missing or invalid connections array".to_string());
            return ValidationReport::from_errors(errors);
        };

        let mut type_ids: HashSet<&str> = ConnectionType::BUILTIN_IDS.into_iter().collect();
        match doc.get("connectionTypes") {
            None | Some(Value::Null) => {}
            Some(Value::Array(defs)) => {
                type_ids.extend(defs.iter().filter_map(|d| d.get("id")).filter_map(Value::as_str));
            }
            Some(_) => errors.push("connectionTypes must be an array".to_string()),
        }

        // device id -> port ids
        let mut device_ports: HashMap<&str, HashSet<&str>> = HashMap::new();

        for (index, device) in devices.iter().enumerate() {
            let id = device.get("id").and_then(Value::as_str).filter(|s| !s.is_empty());
            let name = id.map_or_else(|| index.to_string(), str::to_string);

            let mut port_ids = HashSet::new();
            if let Some(ports) = device.get("ports").and_then(Value::as_array) {
                for port in ports {
                    let Some(port_id) = port.get("id").and_then(Value::as_str) else {
                        errors.push(format!("Device {name} has a port without id"));
                        continue;
                    };
                    if !port_ids.insert(port_id) {
                        errors.push(format!("Device {name} has duplicate port id: {port_id}"));
                    }
                    let port_type = port.get("type").and_then(Value::as_str).unwrap_or_default();
                    if !type_ids.contains(port_type) {
                        errors.push(format!("Port {port_id} on device {name} has invalid type: {port_type}"));
                    }
                }
            }

            match id {
                None => errors.push(format!("Device at index {index} missing id")),
                Some(id) if device_ports.contains_key(id) => {
                    errors.push(format!("Duplicate device id: {id}"));
                }
                Some(id) => {
                    device_ports.insert(id, port_ids);
                }
            }

            let device_type = device.get("type").and_then(Value::as_str);
            if device_type.and_then(DeviceType::from_name).is_none() {
                errors.push(format!(
                    "Device {name} has invalid type: {}",
                    device_type.unwrap_or("undefined")
                ));
            }

            if device.as_object().and_then(|d| non_empty_str(d, "label")).is_none() {
                errors.push(format!("Device {name} missing or invalid label"));
            }

            let position = device.get("position");
            let has_coords = position
                .map(|p| p.get("x").is_some_and(Value::is_number) && p.get("y").is_some_and(Value::is_number))
                .unwrap_or(false);
            if !has_coords {
                errors.push(format!("Device {name} has invalid position"));
            }

            let canvas = device.get("canvas").and_then(Value::as_str);
            if !matches!(canvas, Some("current") | Some("target")) {
                errors.push(format!(
                    "Device {name} has invalid canvas: {}",
                    canvas.unwrap_or("undefined")
                ));
            }
        }

        for (index, conn) in connections.iter().enumerate() {
            let id = conn.get("id").and_then(Value::as_str).filter(|s| !s.is_empty());
            let name = id.map_or_else(|| index.to_string(), str::to_string);
            if id.is_none() {
                errors.push(format!("Connection at index {index} missing id"));
            }

            for (end, port_key) in [("source", "sourcePort"), ("target", "targetPort")] {
                let device_id = conn.get(end).and_then(Value::as_str).unwrap_or_default();
                let ports = device_ports.get(device_id);
                if ports.is_none() {
                    errors.push(format!(
                        "Connection {name} references invalid {end} device: {device_id}"
                    ));
                }

                match conn.as_object().and_then(|c| non_empty_str(c, port_key)) {
                    None => errors.push(format!("Connection {name} missing or invalid {port_key}")),
                    Some(port_id) => {
                        if ports.is_some_and(|p| !p.contains(port_id)) {
                            errors.push(format!(
                                "Connection {name} references unknown {port_key} {port_id} on device {device_id}"
                            ));
                        }
                    }
                }
            }

            let conn_type = conn.get("type").and_then(Value::as_str).unwrap_or_default();
            if !type_ids.contains(conn_type) {
                errors.push(format!("Connection {name} has invalid type: {conn_type}"));
            }
        }

        ValidationReport::from_errors(errors)
    }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_doc() -> Value {
        json!({
            "version": "1.0",
            "name": "Desk",
            "devices": [
                {
                    "id": "device-mac", "type": "computer", "label": "Mac",
                    "detectionId": "computer", "position": { "x": 0, "y": 0 }, "canvas": "current",
                    "ports": [{ "id": "usb-c-1", "label": "USB-C 1", "type": "usb", "position": "right", "direction": "bidirectional" }]
                },
                {
                    "id": "device-kb", "type": "usb-device", "label": "Keyboard",
                    "detectionId": null, "position": { "x": 300.0, "y": 0.0 }, "canvas": "target",
                    "ports": [{ "id": "usb", "label": "USB", "type": "usb", "position": "left", "direction": "in" }]
                }
            ],
            "connections": [
                { "id": "conn-1", "source": "device-mac", "target": "device-kb",
                  "sourcePort": "usb-c-1", "targetPort": "usb", "type": "usb", "label": "" }
            ],
            "connectionTypes": [{ "id": "usb", "name": "USB", "color": "#4169e1" }]
        })
    }

    fn errors_for(doc: &Value) -> Vec<String> {
        SchemaValidator.validate(doc).errors
    }

    #[test]
    fn test_valid_document() {
        let report = SchemaValidator.validate(&valid_doc());
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_missing_arrays_stop_validation() {
        let errors = errors_for(&json!({ "version": "1.0", "name": "x" }));
        assert_eq!(errors, vec!["Missing or invalid devices array"]);
        assert!(!SchemaValidator.validate(&json!(null)).valid);
    }

    #[test]
    fn test_dangling_endpoint() {
        let mut doc = valid_doc();
        doc["connections"][0]["target"] = json!("device-gone");
        let errors = errors_for(&doc);
        assert_eq!(errors, vec!["Connection conn-1 references invalid target device: device-gone"]);
    }

    #[test]
    fn test_unknown_port() {
        let mut doc = valid_doc();
        doc["connections"][0]["sourcePort"] = json!("thunderbolt-1");
        let errors = errors_for(&doc);
        assert_eq!(
            errors,
            vec!["Connection conn-1 references unknown sourcePort thunderbolt-1 on device device-mac"]
        );
    }

    #[test]
    fn test_custom_connection_types_extend_registry() {
        let mut doc = valid_doc();
        doc["connections"][0]["type"] = json!("ctype-lightning");
        assert_eq!(errors_for(&doc), vec!["Connection conn-1 has invalid type: ctype-lightning"]);

        doc["connectionTypes"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "id": "ctype-lightning", "name": "Lightning", "color": "#888888" }));
        assert!(errors_for(&doc).is_empty());
    }

    #[test]
    fn test_device_field_checks() {
        let mut doc = valid_doc();
        doc["devices"][1]["type"] = json!("printer");
        doc["devices"][1]["canvas"] = json!("side");
        doc["devices"][1]["position"] = json!({ "x": "1" });
        doc["devices"][1]["label"] = json!("");
        let errors = errors_for(&doc);
        assert_eq!(
            errors,
            vec![
                "Device device-kb has invalid type: printer",
                "Device device-kb missing or invalid label",
                "Device device-kb has invalid position",
                "Device device-kb has invalid canvas: side",
            ]
        );
    }

    #[test]
    fn test_duplicate_ids() {
        let mut doc = valid_doc();
        doc["devices"][1]["id"] = json!("device-mac");
        doc["connections"][0]["target"] = json!("device-mac");
        doc["connections"][0]["targetPort"] = json!("usb-c-1");
        let errors = errors_for(&doc);
        assert_eq!(errors, vec!["Duplicate device id: device-mac"]);
    }

    #[test]
    fn test_port_type_must_be_registered() {
        let mut doc = valid_doc();
        doc["devices"][0]["ports"][0]["type"] = json!("firewire");
        let errors = errors_for(&doc);
        assert_eq!(errors, vec!["Port usb-c-1 on device device-mac has invalid type: firewire"]);
    }
}
