//! Live mount table, as reported by `findmnt`.
//!
//! `findmnt` reads `/proc/self/mountinfo` and decodes its escaped fields, so
//! paths with spaces come back as plain strings. Two flags shape the output:
//!
//! - `--list` gives a flat list in kernel order instead of a tree.
//! - `--nofsroot` keeps bind mounts and btrfs subvolumes from carrying a
//!   `[/dir]` suffix in the source column.
//!
//! ```text
//! SOURCE     TARGET
//! /dev/sda2  /
//! tmpfs      /tmp
//! /dev/sda1  /boot/efi
//! /dev/sdb1  /home
//! ```

use anyhow::{Context, Error};
use serde::Deserialize;

use crate::dependencies::Dependency;

/// Columns requested from `findmnt`, in the shape of `MountEntry`.
pub const FINDMNT_COLUMNS: &str = "source,target";

#[derive(Debug, Deserialize)]
struct FindmntOutput {
    filesystems: Vec<MountEntry>,
}

/// One line of the live mount table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MountEntry {
    /// Mounted device. `null` for mounts without a backing source, such as
    /// some container overlays.
    pub source: Option<String>,

    pub target: String,
}

/// Lists the mounts that have a source, as `(source, target)` pairs in
/// kernel order.
pub fn list_mounts() -> Result<Vec<(String, String)>, Error> {
    let output = Dependency::Findmnt
        .cmd()
        .args(["--json", "--list", "--nofsroot", "-o", FINDMNT_COLUMNS])
        .output_and_check()
        .context("Failed to list mounted filesystems")?;

    Ok(with_source(parse(&output)?))
}

fn parse(json: &str) -> Result<Vec<MountEntry>, Error> {
    let output: FindmntOutput =
        serde_json::from_str(json).context("Failed to parse findmnt output")?;
    Ok(output.filesystems)
}

fn with_source(entries: Vec<MountEntry>) -> Vec<(String, String)> {
    entries
        .into_iter()
        .filter_map(|entry| Some((entry.source?, entry.target)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let json = indoc::indoc! {r#"
            {
               "filesystems": [
                  {"source": "/dev/sda2", "target": "/"},
                  {"source": "tmpfs", "target": "/tmp"},
                  {"source": null, "target": "/run/containerd/rootfs"},
                  {"source": "/dev/sdb1", "target": "/home/user/My Files"}
               ]
            }
        "#};

        let entries = parse(json).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[2],
            MountEntry {
                source: None,
                target: "/run/containerd/rootfs".into(),
            }
        );

        assert_eq!(
            with_source(entries),
            vec![
                ("/dev/sda2".to_string(), "/".to_string()),
                ("tmpfs".to_string(), "/tmp".to_string()),
                ("/dev/sdb1".to_string(), "/home/user/My Files".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse(r#"{"filesystems": [{"source": "foo"}]}"#).is_err());
        assert!(parse(r#"{"mounts": []}"#).is_err());
        assert!(parse(r#"{"filesystems": {"source": "foo"}}"#).is_err());
        assert!(parse(r#"{"filesystems": []}"#).unwrap().is_empty());
    }
}
