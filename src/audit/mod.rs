//! Partition classification engine.
//!
//! For every partition found on the system, the engine decides whether the
//! static mount table references it by UUID or PARTUUID, and whether it is
//! mounted where the table says it should be. The system-facing pieces
//! (device enumeration, probing, and reading the mount tables) sit behind the
//! traits in this module so the engine can run against in-memory tables.

use std::fmt::{Display, Formatter, Result as FmtResult};

use anyhow::Error;
use serde::{Serialize, Serializer};
use strum_macros::Display as StrumDisplay;

pub mod classifier;
pub mod identifier;
pub mod matcher;

pub use classifier::Auditor;
pub use matcher::{ComparisonMode, StaticTableMatcher};

/// Mount point sentinel shown for swap partitions.
pub const SWAP_MOUNT_POINT: &str = "swap";

/// Mount point sentinel shown for partitions missing from the live mount
/// table.
pub const NOT_MOUNTED: &str = "NONE";

/// Static table target used by entries that are not mounted on a directory.
pub const TABLE_TARGET_NONE: &str = "none";

/// Filesystem type reported by the prober for swap partitions.
pub const SWAP_FS_TYPE: &str = "swap";

/// Where a partition is mounted, as far as the audit knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountPoint {
    /// Not present in the live mount table. Rendered as `NONE`.
    Unmounted,

    /// A swap partition. Swap never shows up in the live mount table.
    Swap,

    /// Target of the live mount table entry for this partition.
    Live(String),

    /// Target copied verbatim from the static table entry that references
    /// this partition while it is not mounted. This may be `none`, which is
    /// not the same thing as `Unmounted`.
    Configured(String),
}

impl MountPoint {
    pub fn is_unmounted(&self) -> bool {
        matches!(self, Self::Unmounted)
    }

    /// Whether a static table entry with the given target describes this
    /// mount point.
    ///
    /// A live mount matches its exact target. Swap matches `none` as well as a
    /// literal `swap` target.
    pub fn anchors(&self, target: &str) -> bool {
        match self {
            Self::Live(path) => path == target,
            Self::Swap => target == TABLE_TARGET_NONE || target == SWAP_MOUNT_POINT,
            Self::Unmounted | Self::Configured(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Unmounted => NOT_MOUNTED,
            Self::Swap => SWAP_MOUNT_POINT,
            Self::Live(path) | Self::Configured(path) => path,
        }
    }
}

impl Display for MountPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Serialize for MountPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of checking one partition against the static table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationState {
    /// The table references this identifier at the mount point where the
    /// partition is mounted.
    #[strum(serialize = "OK")]
    Ok,

    /// The table has an entry for this mount point, but with a different
    /// identifier.
    #[strum(serialize = "BAD")]
    Bad,

    /// The table references this identifier, but the partition is not
    /// mounted.
    #[strum(serialize = "OK, NOT MOUNT")]
    OkNotMount,

    /// The table does not reference this partition at all.
    #[strum(serialize = "NOT FOUND")]
    NotFound,
}

/// Working record for one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Device node path, e.g. `/dev/sda1`.
    pub name: String,

    /// Filesystem UUID. Never empty.
    pub uuid: String,

    /// Filesystem type, e.g. `ext4` or `swap`. Empty if the prober did not
    /// report one.
    #[serde(rename = "type")]
    pub fs_type: String,

    pub mount_point: MountPoint,
}

/// A partition together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    #[serde(flatten)]
    pub partition: Partition,
    pub state: ClassificationState,
}

/// A block device produced by the device enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedDevice {
    /// Kernel name, used for diagnostics only.
    pub kernel_name: String,

    /// Device node path, or `None` if it could not be resolved.
    pub node: Option<String>,
}

/// Identification tags read from a device.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub uuid: Option<String>,
    pub fs_type: Option<String>,
}

/// An entry of the live mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMount {
    pub source: String,
    pub target: String,
}

/// An entry of the static mount table, as written in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTableRecord {
    /// Device specification field, e.g. `UUID="1111-AAAA"`.
    pub spec: String,

    /// Mount point field, or `none`.
    pub target: String,
}

/// Lists the block devices present on the system.
pub trait DeviceEnumerator {
    fn enumerate(&self) -> Result<Vec<EnumeratedDevice>, Error>;
}

/// Reads identification tags from a device node.
///
/// An error means the device could not be probed at all (e.g. a card reader
/// without a card) and the device is skipped.
pub trait PartitionProber {
    fn probe(&self, node: &str) -> Result<ProbeResult, Error>;
}

/// Reads the table of currently mounted filesystems.
pub trait LiveMountReader {
    fn read_live_mounts(&self) -> Result<Vec<LiveMount>, Error>;
}

/// Reads the static mount table, in file order.
///
/// An existing but empty table is `Ok(vec![])`. A table that cannot be opened
/// is an error.
pub trait StaticTableReader {
    fn read_static_table(&self) -> Result<Vec<StaticTableRecord>, Error>;

    /// Checks that the table can be opened.
    fn check_available(&self) -> Result<(), Error> {
        self.read_static_table().map(|_| ())
    }
}
