//! Configuration loading

use anyhow::Result;
use scamp_scanner::{LayoutConfig, ProfilerConfig, ReportFiles, ScannerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub profiler: ProfilerSection,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub layout: LayoutSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Label of the root device
    #[serde(default = "default_root_label")]
    pub root_label: String,
    /// Setup name; a dated default is used when absent
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_label: default_root_label(),
            name: None,
        }
    }
}

fn default_root_label() -> String {
    "Mac".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerSection {
    /// Executable used to query hardware
    #[serde(default = "default_command")]
    pub command: String,
    /// Largest report accepted from one query
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

impl Default for ProfilerSection {
    fn default() -> Self {
        Self {
            command: default_command(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

fn default_command() -> String {
    ProfilerConfig::default().command
}

fn default_max_output_bytes() -> usize {
    scamp_scanner::profiler::DEFAULT_MAX_OUTPUT_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Directory holding saved reports
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_usb")]
    pub usb: String,
    #[serde(default = "default_thunderbolt")]
    pub thunderbolt: String,
    #[serde(default = "default_displays")]
    pub displays: String,
    #[serde(default = "default_network")]
    pub network: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            usb: default_usb(),
            thunderbolt: default_thunderbolt(),
            displays: default_displays(),
            network: default_network(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_usb() -> String {
    "usb.json".to_string()
}

fn default_thunderbolt() -> String {
    "thunderbolt.json".to_string()
}

fn default_displays() -> String {
    "displays.json".to_string()
}

fn default_network() -> String {
    "network.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSection {
    /// Distance between rings
    #[serde(default = "default_ring_spacing")]
    pub ring_spacing: f64,
    /// Outermost ring index
    #[serde(default = "default_max_ring")]
    pub max_ring: u32,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            ring_spacing: default_ring_spacing(),
            max_ring: default_max_ring(),
        }
    }
}

fn default_ring_spacing() -> f64 {
    300.0
}

fn default_max_ring() -> u32 {
    3
}

impl Config {
    /// Convert to ScannerConfig
    pub fn to_scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            root_label: self.scan.root_label.clone(),
            layout: LayoutConfig {
                ring_spacing: self.layout.ring_spacing,
                max_ring: self.layout.max_ring,
            },
            profiler: ProfilerConfig {
                command: self.profiler.command.clone(),
                max_output_bytes: self.profiler.max_output_bytes,
            },
        }
    }

    /// Saved report locations, optionally rooted somewhere else
    pub fn report_files(&self, dir_override: Option<&Path>) -> ReportFiles {
        ReportFiles {
            dir: dir_override.map_or_else(|| self.files.dir.clone(), Path::to_path_buf),
            usb: self.files.usb.clone(),
            thunderbolt: self.files.thunderbolt.clone(),
            displays: self.files.displays.clone(),
            network: self.files.network.clone(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
