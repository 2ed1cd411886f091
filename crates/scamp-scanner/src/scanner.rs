//! Scan pipeline: acquire, parse, lay out, map, validate

use scamp_core::{SchemaValidator, Topology, TopologyError, TopologyValidator};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::layout::{calculate_layout, LayoutConfig};
use crate::mapper::{map_to_topology, DroppedConnection};
use crate::parser::parse_profiler_data;
use crate::profiler::{self, ProfilerConfig, ProfilerData, ProfilerSource};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Generated topology is invalid: {}", .0.join(", "))]
    InvalidTopology(Vec<String>),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Label of the synthetic root device
    pub root_label: String,
    pub layout: LayoutConfig,
    pub profiler: ProfilerConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            root_label: "Mac".to_string(),
            layout: LayoutConfig::default(),
            profiler: ProfilerConfig::default(),
        }
    }
}

/// Everything a scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub topology: Topology,
    pub parsed_devices: usize,
    pub parsed_edges: usize,
    pub dropped: Vec<DroppedConnection>,
}

pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Read the raw hardware reports
    pub fn acquire(&self, source: &ProfilerSource) -> ProfilerData {
        profiler::collect(source)
    }

    /// Build and validate a topology named `name` from raw reports
    pub fn run(&self, data: &ProfilerData, name: &str) -> Result<ScanReport, ScanError> {
        self.run_with(data, name, &SchemaValidator)
    }

    pub fn run_with(
        &self,
        data: &ProfilerData,
        name: &str,
        validator: &dyn TopologyValidator,
    ) -> Result<ScanReport, ScanError> {
        let scan = parse_profiler_data(data, &self.config.root_label);
        let positions = calculate_layout(&scan.devices, &self.config.layout);
        debug!(positioned = positions.len(), "Calculated layout");

        let outcome = map_to_topology(&scan, &positions, name);
        if !outcome.dropped.is_empty() {
            warn!(dropped = outcome.dropped.len(), "Some connections could not be mapped");
        }

        let report = outcome.topology.validate_with(validator)?;
        if !report.valid {
            return Err(ScanError::InvalidTopology(report.errors));
        }

        info!(
            devices = outcome.topology.devices.len(),
            connections = outcome.topology.connections.len(),
            "Generated topology"
        );

        Ok(ScanReport {
            topology: outcome.topology,
            parsed_devices: scan.devices.len(),
            parsed_edges: scan.edges.len(),
            dropped: outcome.dropped,
        })
    }
}
