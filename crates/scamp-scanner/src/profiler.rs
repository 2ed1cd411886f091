//! Raw hardware report acquisition
//!
//! Reports come either from running `system_profiler <DataType> -json` or
//! from previously saved JSON files. A subsystem that cannot be read is
//! reported as `None`; acquisition itself never fails.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Default cap on a single report's size (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Hardware subsystem covered by one report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Usb,
    Thunderbolt,
    Displays,
    Network,
}

impl Subsystem {
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Usb,
        Subsystem::Thunderbolt,
        Subsystem::Displays,
        Subsystem::Network,
    ];

    /// system_profiler data type name
    pub fn data_type(&self) -> &'static str {
        match self {
            Subsystem::Usb => "SPUSBDataType",
            Subsystem::Thunderbolt => "SPThunderboltDataType",
            Subsystem::Displays => "SPDisplaysDataType",
            Subsystem::Network => "SPNetworkDataType",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Usb => "usb",
            Subsystem::Thunderbolt => "thunderbolt",
            Subsystem::Displays => "displays",
            Subsystem::Network => "network",
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional report per subsystem
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilerData {
    pub usb: Option<Value>,
    pub thunderbolt: Option<Value>,
    pub displays: Option<Value>,
    pub network: Option<Value>,
}

impl ProfilerData {
    pub fn get(&self, subsystem: Subsystem) -> Option<&Value> {
        match subsystem {
            Subsystem::Usb => self.usb.as_ref(),
            Subsystem::Thunderbolt => self.thunderbolt.as_ref(),
            Subsystem::Displays => self.displays.as_ref(),
            Subsystem::Network => self.network.as_ref(),
        }
    }

    pub fn set(&mut self, subsystem: Subsystem, report: Option<Value>) {
        let slot = match subsystem {
            Subsystem::Usb => &mut self.usb,
            Subsystem::Thunderbolt => &mut self.thunderbolt,
            Subsystem::Displays => &mut self.displays,
            Subsystem::Network => &mut self.network,
        };
        *slot = report;
    }

    /// Number of subsystems with a report
    pub fn available(&self) -> usize {
        Subsystem::ALL.iter().filter(|s| self.get(**s).is_some()).count()
    }
}

/// How to run system_profiler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Executable to run
    pub command: String,
    /// Reports larger than this are discarded
    pub max_output_bytes: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            command: "system_profiler".to_string(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// Saved report locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFiles {
    pub dir: PathBuf,
    pub usb: String,
    pub thunderbolt: String,
    pub displays: String,
    pub network: String,
}

impl Default for ReportFiles {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            usb: "usb.json".to_string(),
            thunderbolt: "thunderbolt.json".to_string(),
            displays: "displays.json".to_string(),
            network: "network.json".to_string(),
        }
    }
}

impl ReportFiles {
    pub fn path(&self, subsystem: Subsystem) -> PathBuf {
        let name = match subsystem {
            Subsystem::Usb => &self.usb,
            Subsystem::Thunderbolt => &self.thunderbolt,
            Subsystem::Displays => &self.displays,
            Subsystem::Network => &self.network,
        };
        self.dir.join(name)
    }
}

/// Where reports are read from
#[derive(Debug, Clone)]
pub enum ProfilerSource {
    /// Run system_profiler on this host
    System(ProfilerConfig),
    /// Load saved JSON reports
    Files(ReportFiles),
}

/// Collect every subsystem report from `source`
pub fn collect(source: &ProfilerSource) -> ProfilerData {
    let mut data = ProfilerData::default();
    match source {
        ProfilerSource::System(config) => {
            info!(command = %config.command, "Scanning devices");
            for subsystem in Subsystem::ALL {
                let report = match run_profiler(config, subsystem) {
                    Ok(report) => Some(report),
                    Err(e) => {
                        warn!(subsystem = %subsystem, "Failed to run {} {}: {:#}", config.command, subsystem.data_type(), e);
                        None
                    }
                };
                data.set(subsystem, report);
            }
        }
        ProfilerSource::Files(files) => {
            info!(dir = %files.dir.display(), "Loading device data from files");
            for subsystem in Subsystem::ALL {
                data.set(subsystem, load_report(&files.path(subsystem)));
            }
        }
    }
    debug!(available = data.available(), "Collected hardware reports");
    data
}

/// Run one system_profiler query, reading at most `max_output_bytes`
fn run_profiler(config: &ProfilerConfig, subsystem: Subsystem) -> Result<Value> {
    let mut child = Command::new(&config.command)
        .args([subsystem.data_type(), "-json"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {}", config.command))?;

    let mut stdout = Vec::new();
    if let Some(pipe) = child.stdout.take() {
        if let Err(e) = pipe.take(config.max_output_bytes as u64 + 1).read_to_end(&mut stdout) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e).context("failed to read output");
        }
    }

    if stdout.len() > config.max_output_bytes {
        let _ = child.kill();
        let _ = child.wait();
        bail!("output exceeds {} bytes", config.max_output_bytes);
    }

    let status = child.wait()?;
    if !status.success() {
        bail!("exited with {}", status);
    }

    Ok(serde_json::from_slice(&stdout)?)
}

/// Load a saved report; a missing file is simply absent
fn load_report(path: &Path) -> Option<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Report file not found");
        return None;
    }

    let result = std::fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| Ok(serde_json::from_str::<Value>(&content)?));

    match result {
        Ok(report) => Some(report),
        Err(e) => {
            warn!(path = %path.display(), "Failed to load report: {:#}", e);
            None
        }
    }
}
