//! Scamp Scan - Main entry point
//!
//! Scans the hardware attached to this machine (or saved reports) and writes
//! a topology file for the diagram editor.

mod config;

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Parser;
use scamp_scanner::{ProfilerSource, ScanError, Scanner};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "scamp-scan")]
#[command(about = "Scan attached hardware into a topology diagram")]
#[command(version)]
struct Args {
    /// Output file (default: topology-<timestamp>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Setup name written into the topology
    #[arg(short, long)]
    name: Option<String>,

    /// Load saved JSON reports instead of running system_profiler
    #[arg(short, long)]
    from_files: bool,

    /// Directory containing saved reports (implies --from-files)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "scamp.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Scamp scanner v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args.config)?;
    let scanner = Scanner::new(config.to_scanner_config());

    let source = if args.from_files || args.data_dir.is_some() {
        ProfilerSource::Files(config.report_files(args.data_dir.as_deref()))
    } else {
        ProfilerSource::System(scanner.config().profiler.clone())
    };

    let now = Local::now();
    let name = args
        .name
        .or_else(|| config.scan.name.clone())
        .unwrap_or_else(|| default_setup_name(&now));

    let data = scanner.acquire(&source);
    let report = match scanner.run(&data, &name) {
        Ok(report) => report,
        Err(ScanError::InvalidTopology(errors)) => {
            error!(count = errors.len(), "Generated topology failed validation");
            eprintln!("Generated topology is invalid:");
            for e in &errors {
                eprintln!("  - {}", e);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let output = args.output.unwrap_or_else(|| default_output_path(&now));
    report.topology.to_file(&output)?;

    println!("Topology saved to {}", output.display());
    println!("  Devices: {}", report.topology.devices.len());
    println!("  Connections: {}", report.topology.connections.len());
    if !report.dropped.is_empty() {
        println!("  Skipped connections: {}", report.dropped.len());
    }

    Ok(())
}

fn default_setup_name(now: &DateTime<Local>) -> String {
    format!("Scanned Setup {}", now.format("%Y-%m-%d"))
}

/// `topology-<millis since epoch in base 36>.json`
fn default_output_path(now: &DateTime<Local>) -> PathBuf {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    PathBuf::from(format!("topology-{}.json", to_base36(millis)))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_default_names() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(default_setup_name(&now), "Scanned Setup 2024-03-09");
        let path = default_output_path(&now);
        let file = path.to_string_lossy();
        assert!(file.starts_with("topology-"));
        assert!(file.ends_with(".json"));
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(["scamp-scan", "-f", "-d", "reports", "-o", "desk.json", "-n", "Desk"]);
        assert!(args.from_files);
        assert_eq!(args.data_dir, Some(PathBuf::from("reports")));
        assert_eq!(args.output, Some(PathBuf::from("desk.json")));
        assert_eq!(args.name.as_deref(), Some("Desk"));
        assert_eq!(args.config, PathBuf::from("scamp.toml"));
        assert_eq!(args.log_level, "info");
    }
}
