// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use rosbag_v2_bridge::{IoFlag, ReadOnlyStorage, RosbagV2Storage, TypeNameMapper};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Arguments shared by every subcommand.
#[derive(Args, Clone, Debug)]
pub struct BagArgs {
    /// Input ROS1 bag
    #[arg(value_name = "BAG")]
    pub input: PathBuf,

    /// TOML file with extra legacy → ROS2 type mappings
    #[arg(long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,
}

impl BagArgs {
    /// Open the bag read-only with the requested type mapping.
    pub fn open(&self) -> Result<RosbagV2Storage> {
        let mapper = load_mapper(self.mapping.as_deref())?;
        let mut storage = RosbagV2Storage::with_mapper(mapper);
        let uri = self
            .input
            .to_str()
            .with_context(|| format!("path is not UTF-8: {}", self.input.display()))?;
        storage
            .open(uri, IoFlag::ReadOnly)
            .with_context(|| format!("failed to open {}", self.input.display()))?;
        Ok(storage)
    }
}

fn load_mapper(path: Option<&Path>) -> Result<Arc<TypeNameMapper>> {
    Ok(Arc::new(match path {
        Some(path) => TypeNameMapper::from_file(path)
            .with_context(|| format!("failed to load mapping {}", path.display()))?,
        None => TypeNameMapper::builtin(),
    }))
}

/// Format a duration in nanoseconds to human-readable string.
pub fn format_duration(nanos: u64) -> String {
    let secs = nanos / 1_000_000_000;
    let millis = (nanos % 1_000_000_000) / 1_000_000;

    if secs >= 3600 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        format!("{}h {}m", hours, minutes)
    } else if secs >= 60 {
        let minutes = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", minutes, remaining_secs)
    } else {
        format!("{}.{:03}s", secs, millis)
    }
}

/// Format a timestamp in nanoseconds as `<date> (<seconds>.<nanos>)`.
pub fn format_timestamp(nanos: u64) -> String {
    let secs = (nanos / 1_000_000_000) as i64;
    let subsec = (nanos % 1_000_000_000) as u32;
    match chrono::DateTime::<chrono::Utc>::from_timestamp(secs, subsec) {
        Some(dt) => format!(
            "{} ({}.{:09})",
            dt.format("%b %e %Y %H:%M:%S%.3f"),
            secs,
            subsec
        ),
        None => format!("{} ns", nanos),
    }
}

/// Format a byte count with binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1_500_000_000), "1.500s");
        assert_eq!(format_duration(0), "0.000s");
        assert_eq!(format_duration(125 * 1_000_000_000), "2m 5s");
        assert_eq!(format_duration(3_660 * 1_000_000_000), "1h 1m");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn test_format_timestamp_keeps_nanos() {
        assert!(format_timestamp(1_000_000_001).ends_with("(1.000000001)"));
    }
}
