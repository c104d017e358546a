use log::info;
use nix::unistd::Uid;

pub mod audit;
pub mod cli;
pub mod error;
pub mod report;
pub mod system;

use audit::{Auditor, Classification, StaticTableReader};
use cli::Cli;
use system::{BlkidProber, FindmntLiveMounts, FstabReader, LsblkEnumerator};

pub use error::AuditError;

/// chkuuid package version
pub const CHKUUID_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default location of the static mount table.
pub const DEFAULT_FSTAB_PATH: &str = "/etc/fstab";

/// Audits every partition on this system against the configured static
/// mount table.
pub fn run(args: &Cli) -> Result<Vec<Classification>, AuditError> {
    if !args.skip_root_check && !Uid::effective().is_root() {
        return Err(AuditError::MissingPermissions);
    }

    let static_table = FstabReader::new(&args.fstab);
    static_table
        .check_available()
        .map_err(AuditError::StaticTableUnavailable)?;
    info!(
        "Checking partitions against '{}'",
        static_table.path().display()
    );

    Auditor::new(
        LsblkEnumerator,
        BlkidProber,
        FindmntLiveMounts,
        static_table,
    )
    .with_comparison_mode(args.comparison_mode())
    .run()
}
