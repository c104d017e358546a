/// Errors that stop an audit run.
///
/// Devices that cannot be resolved or probed, and devices without a
/// filesystem UUID, are skipped and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Administrator permission are needed, root privileges required")]
    MissingPermissions,

    #[error("Could not open the fstab file")]
    StaticTableUnavailable(#[source] anyhow::Error),

    #[error("Failed to enumerate block devices")]
    Enumeration(#[source] anyhow::Error),

    #[error("Failed to read the live mount table while checking '{device}'")]
    LiveMountTable {
        device: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read the static mount table while checking '{device}'")]
    StaticTable {
        device: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Audit aborted by an internal error: {0}")]
    Panic(String),
}
