//! Matching of a partition against the static mount table.

use anyhow::Error;
use log::trace;

use super::{
    identifier::{self, Identifier},
    ClassificationState, MountPoint, Partition, StaticTableReader, StaticTableRecord,
};

/// How a static table identifier is compared with a partition UUID.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Only the first `len(partition UUID)` characters of the table
    /// identifier are compared, so a table identifier with trailing content
    /// still matches. A table identifier shorter than the partition UUID
    /// does not match.
    #[default]
    Prefix,

    /// Both identifiers must be equal.
    Exact,
}

impl ComparisonMode {
    pub fn matches(&self, table_identifier: &str, partition_uuid: &str) -> bool {
        match self {
            Self::Prefix => table_identifier.starts_with(partition_uuid),
            Self::Exact => table_identifier == partition_uuid,
        }
    }
}

/// Classifies partitions against a static table reader.
///
/// The table is read again for every partition, and the records are dropped
/// once the partition is classified.
pub struct StaticTableMatcher<'a, R: ?Sized> {
    reader: &'a R,
    mode: ComparisonMode,
}

impl<'a, R: StaticTableReader + ?Sized> StaticTableMatcher<'a, R> {
    pub fn new(reader: &'a R, mode: ComparisonMode) -> Self {
        Self { reader, mode }
    }

    /// Reads the static table and classifies `partition` against it.
    ///
    /// See [`match_records`] for how `partition.mount_point` may change.
    pub fn classify(&self, partition: &mut Partition) -> Result<ClassificationState, Error> {
        let records = self.reader.read_static_table()?;
        Ok(match_records(partition, &records, self.mode))
    }
}

/// Classifies `partition` against `records`, in table order.
///
/// Records using a label or a device path, and records without a UUID or
/// PARTUUID identifier, are skipped.
///
/// A mounted partition (including swap) is looked up by mount point: the
/// first record for that mount point decides between `Ok` and `Bad`, even if
/// a later record carries the right identifier.
///
/// An unmounted partition is looked up by identifier: the first matching
/// record gives `OkNotMount`, and its target becomes the partition's
/// `mount_point`.
///
/// Otherwise the partition is `NotFound` and its mount point is untouched.
pub fn match_records(
    partition: &mut Partition,
    records: &[StaticTableRecord],
    mode: ComparisonMode,
) -> ClassificationState {
    for record in records {
        if identifier::is_unsupported_scheme(&record.spec) {
            continue;
        }

        let Some(Identifier { scheme, value }) = identifier::extract(&record.spec) else {
            continue;
        };

        if partition.mount_point.is_unmounted() {
            if mode.matches(value, &partition.uuid) {
                trace!(
                    "'{}' is referenced by {scheme} at '{}' while not mounted",
                    partition.name,
                    record.target
                );
                partition.mount_point = MountPoint::Configured(record.target.clone());
                return ClassificationState::OkNotMount;
            }
        } else if partition.mount_point.anchors(&record.target) {
            trace!(
                "'{}' mounted at '{}' is configured with {scheme} '{value}'",
                partition.name,
                partition.mount_point
            );
            return if mode.matches(value, &partition.uuid) {
                ClassificationState::Ok
            } else {
                ClassificationState::Bad
            };
        }
    }

    ClassificationState::NotFound
}
