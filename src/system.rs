//! Collaborators backed by the running system.

use std::path::{Path, PathBuf};

use anyhow::{Context, Error};

use osutils::{blkid, findmnt, lsblk, tabfile::TabFile};

use crate::audit::{
    DeviceEnumerator, EnumeratedDevice, LiveMount, LiveMountReader, PartitionProber, ProbeResult,
    StaticTableReader, StaticTableRecord,
};

/// Enumerates disks and partitions with `lsblk`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LsblkEnumerator;

impl DeviceEnumerator for LsblkEnumerator {
    fn enumerate(&self) -> Result<Vec<EnumeratedDevice>, Error> {
        Ok(lsblk::list()?
            .into_iter()
            .map(|device| EnumeratedDevice {
                kernel_name: device.kname,
                node: device.path,
            })
            .collect())
    }
}

/// Probes devices with `blkid`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlkidProber;

impl PartitionProber for BlkidProber {
    fn probe(&self, node: &str) -> Result<ProbeResult, Error> {
        let info = blkid::probe(node)?;
        Ok(ProbeResult {
            uuid: info.uuid,
            fs_type: info.fs_type,
        })
    }
}

/// Reads the live mount table with `findmnt`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FindmntLiveMounts;

impl LiveMountReader for FindmntLiveMounts {
    fn read_live_mounts(&self) -> Result<Vec<LiveMount>, Error> {
        Ok(findmnt::list_mounts()?
            .into_iter()
            .map(|(source, target)| LiveMount { source, target })
            .collect())
    }
}

/// Reads a static mount table in fstab format.
#[derive(Debug, Clone)]
pub struct FstabReader {
    path: PathBuf,
}

impl FstabReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StaticTableReader for FstabReader {
    fn read_static_table(&self) -> Result<Vec<StaticTableRecord>, Error> {
        Ok(TabFile::read(&self.path)?
            .entries
            .into_iter()
            .map(|entry| StaticTableRecord {
                spec: entry.spec,
                target: entry.target,
            })
            .collect())
    }

    fn check_available(&self) -> Result<(), Error> {
        std::fs::File::open(&self.path)
            .map(|_| ())
            .with_context(|| format!("Failed to open '{}'", self.path.display()))
    }
}
