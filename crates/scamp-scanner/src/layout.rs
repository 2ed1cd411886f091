//! Concentric-ring layout by hierarchy depth
//!
//! The root sits at the origin. Every other depth gets its own ring, and the
//! devices at that depth are spread evenly around it starting from the top
//! and moving clockwise (screen coordinates, y grows downward).

use scamp_core::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::parser::ParsedDevice;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance between consecutive rings
    pub ring_spacing: f64,
    /// Depths beyond this share the outermost ring
    pub max_ring: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ring_spacing: 300.0,
            max_ring: 3,
        }
    }
}

impl LayoutConfig {
    /// Ring radius for a depth
    pub fn radius(&self, depth: u32) -> f64 {
        self.ring_spacing * f64::from(depth.min(self.max_ring.max(1)))
    }
}

/// Compute positions keyed by detection ID
pub fn calculate_layout(devices: &[ParsedDevice], config: &LayoutConfig) -> HashMap<String, Position> {
    // Ascending depth; devices keep their discovery order within a ring
    let mut rings: BTreeMap<u32, Vec<&ParsedDevice>> = BTreeMap::new();
    for device in devices {
        rings.entry(device.depth).or_default().push(device);
    }

    let mut positions = HashMap::with_capacity(devices.len());
    for (depth, ring) in rings {
        if depth == 0 {
            for device in ring {
                positions.insert(device.detection_id.clone(), Position::ORIGIN);
            }
            continue;
        }

        let radius = config.radius(depth);
        let step = TAU / ring.len() as f64;
        for (index, device) in ring.into_iter().enumerate() {
            let angle = -FRAC_PI_2 + step * index as f64;
            positions.insert(
                device.detection_id.clone(),
                Position::new(round1(radius * angle.cos()), round1(radius * angle.sin())),
            );
        }
    }
    positions
}

/// Round to one decimal place with halves going toward +inf, folding -0.0
/// into 0.0
fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0 + 0.0
}
