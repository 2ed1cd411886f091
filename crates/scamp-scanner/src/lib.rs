//! Scamp Scanner - Hardware inventory to topology conversion
//!
//! The pipeline has four stages:
//! - Acquisition of `system_profiler` reports (or saved copies of them)
//! - Parsing the nested reports into flat devices and parent/child edges
//! - Concentric-ring layout by hierarchy depth
//! - Mapping onto a validated topology document

pub mod layout;
pub mod mapper;
pub mod parser;
pub mod profiler;
pub mod scanner;

pub use layout::{calculate_layout, LayoutConfig};
pub use mapper::{find_matching_port, map_to_topology, DropReason, DroppedConnection, MapOutcome, PortRole};
pub use parser::{parse_profiler_data, DeviceKind, EdgeKind, ParsedDevice, ParsedEdge, ParsedScan};
pub use profiler::{ProfilerConfig, ProfilerData, ProfilerSource, ReportFiles, Subsystem};
pub use scanner::{ScanError, ScanReport, Scanner, ScannerConfig};
