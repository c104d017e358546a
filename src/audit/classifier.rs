//! Orchestration of a full audit run: enumerate, probe, locate the live mount,
//! then match against the static table.

use log::{debug, info};

use crate::error::AuditError;

use super::{
    Classification, ComparisonMode, DeviceEnumerator, LiveMountReader, MountPoint, Partition,
    PartitionProber, ProbeResult, StaticTableMatcher, StaticTableReader, SWAP_FS_TYPE,
};

/// Runs the audit over all devices produced by the enumerator.
///
/// Devices are handled one at a time. Each one gets a fresh `Partition`, so
/// nothing carries over from the previous device.
pub struct Auditor<E, P, L, S> {
    enumerator: E,
    prober: P,
    live_mounts: L,
    static_table: S,
    mode: ComparisonMode,
}

impl<E, P, L, S> Auditor<E, P, L, S>
where
    E: DeviceEnumerator,
    P: PartitionProber,
    L: LiveMountReader,
    S: StaticTableReader,
{
    pub fn new(enumerator: E, prober: P, live_mounts: L, static_table: S) -> Self {
        Self {
            enumerator,
            prober,
            live_mounts,
            static_table,
            mode: ComparisonMode::default(),
        }
    }

    pub fn with_comparison_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Classifies every partition on the system.
    ///
    /// Either all partitions are classified, or the first fatal error is
    /// returned and no classification is.
    pub fn run(&self) -> Result<Vec<Classification>, AuditError> {
        let devices = self
            .enumerator
            .enumerate()
            .map_err(AuditError::Enumeration)?;
        debug!("Found {} block devices", devices.len());

        let mut classifications = Vec::new();
        for device in devices {
            let Some(node) = device.node else {
                debug!(
                    "Skipping '{}': device node could not be resolved",
                    device.kernel_name
                );
                continue;
            };

            let probe = match self.prober.probe(&node) {
                Ok(probe) => probe,
                Err(e) => {
                    debug!("Skipping '{node}': {e:#}");
                    continue;
                }
            };

            if let Some(classification) = self.classify(node, probe)? {
                classifications.push(classification);
            }
        }

        info!("Classified {} partitions", classifications.len());
        Ok(classifications)
    }

    /// Classifies a single probed device.
    ///
    /// Returns `None` if the device has no filesystem UUID, which is how
    /// whole disks are told apart from their partitions.
    pub fn classify(
        &self,
        name: String,
        probe: ProbeResult,
    ) -> Result<Option<Classification>, AuditError> {
        let uuid = match probe.uuid {
            Some(uuid) if !uuid.is_empty() => uuid,
            _ => {
                debug!("Skipping '{name}': no filesystem UUID");
                return Ok(None);
            }
        };

        let fs_type = probe.fs_type.unwrap_or_default();

        // Swap is never listed in the live mount table
        let mount_point = if fs_type == SWAP_FS_TYPE {
            MountPoint::Swap
        } else {
            self.find_live_mount(&name)?
        };

        let mut partition = Partition {
            name,
            uuid,
            fs_type,
            mount_point,
        };

        let state = StaticTableMatcher::new(&self.static_table, self.mode)
            .classify(&mut partition)
            .map_err(|source| AuditError::StaticTable {
                device: partition.name.clone(),
                source,
            })?;

        debug!(
            "'{}' ({}, {}) mounted at '{}': {state}",
            partition.name, partition.uuid, partition.fs_type, partition.mount_point
        );

        Ok(Some(Classification { partition, state }))
    }

    /// Looks up where `name` is mounted. The first live mount with that
    /// exact source wins.
    fn find_live_mount(&self, name: &str) -> Result<MountPoint, AuditError> {
        let mounts = self.live_mounts.read_live_mounts();
        let mounts = mounts.map_err(|source| AuditError::LiveMountTable {
            device: name.to_owned(),
            source,
        })?;

        Ok(mounts
            .into_iter()
            .find(|mount| mount.source == name)
            .map(|mount| MountPoint::Live(mount.target))
            .unwrap_or(MountPoint::Unmounted))
    }
}
