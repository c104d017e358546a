use anyhow::{Context, Error};
use log::debug;
use serde::Deserialize;

use crate::dependencies::Dependency;

/// Columns requested from `lsblk`, in the shape of `BlockDevice`.
pub const LSBLK_COLUMNS: &str = "KNAME,PATH";

#[derive(Deserialize, Debug)]
struct LsblkOutput {
    blockdevices: Vec<BlockDevice>,
}

/// A block device as reported by `lsblk --list --paths`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    /// Kernel name, e.g. `/dev/dm-0`.
    pub kname: String,

    /// Device node, e.g. `/dev/mapper/luks-home`. `None` when `lsblk` could
    /// not resolve one.
    pub path: Option<String>,
}

/// Lists every block device on the system, whole disks and partitions alike,
/// in `lsblk` order.
pub fn list() -> Result<Vec<BlockDevice>, Error> {
    let output = Dependency::Lsblk
        .cmd()
        .args(["--json", "--list", "--paths", "--output", LSBLK_COLUMNS])
        .output_and_check()
        .context("Failed to list block devices")?;

    let devices = parse(&output).with_context(|| format!("Unexpected lsblk output:\n{output}"))?;
    debug!("lsblk reported {} block devices", devices.len());
    Ok(devices)
}

fn parse(json: &str) -> Result<Vec<BlockDevice>, Error> {
    let output: LsblkOutput = serde_json::from_str(json).context("Failed to parse lsblk output")?;
    Ok(output.blockdevices)
}
