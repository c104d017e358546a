use std::{collections::HashMap, path::Path};

use anyhow::{Context, Error};

use crate::dependencies::Dependency;

/// Exit status used by `blkid` when no filesystem or partition information
/// could be gathered from the device.
pub const BLKID_EXIT_NOTHING_DETECTED: i32 = 2;

/// Tags read from a low-level probe of a single device.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProbeInfo {
    /// Filesystem UUID (`UUID` tag).
    pub uuid: Option<String>,

    /// Filesystem type (`TYPE` tag), e.g. `ext4` or `swap`.
    pub fs_type: Option<String>,
}

/// Runs a low-level superblock probe on `device_path`.
///
/// A device with nothing recognizable on it produces an empty `ProbeInfo`,
/// not an error. Any other failure, such as a card reader with no card in it,
/// is returned as an error.
pub fn probe(device_path: impl AsRef<Path>) -> Result<ProbeInfo, Error> {
    let output = Dependency::Blkid
        .cmd()
        .arg("--probe")
        .arg("--output")
        .arg("export")
        .arg(device_path.as_ref())
        .output()
        .context("Failed to execute blkid")?;

    if output.code() == Some(BLKID_EXIT_NOTHING_DETECTED) {
        return Ok(ProbeInfo::default());
    }

    output.check().with_context(|| {
        format!(
            "Failed to probe device '{}'",
            device_path.as_ref().display()
        )
    })?;

    Ok(ProbeInfo::from_export(output.stdout()))
}

impl ProbeInfo {
    /// Builds a `ProbeInfo` from `blkid --output export` output.
    fn from_export(output: &str) -> Self {
        let mut tags = parse_export_output(output);
        Self {
            uuid: tags.remove("UUID"),
            fs_type: tags.remove("TYPE"),
        }
    }
}

/// Parses `KEY=value` lines. Values are shell-escaped by blkid, so a backslash
/// escapes the character that follows it.
fn parse_export_output(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), unescape(value)))
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.extend(chars.next()),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_export() {
        let output = indoc::indoc! {r#"
            DEVNAME=/dev/sda2
            UUID=f4c40183-0a2d-4d97-b71e-25a4043ce01f
            BLOCK_SIZE=4096
            TYPE=ext4
            USAGE=filesystem
            PART_ENTRY_UUID=af002b41-3dbe-4044-82d2-f0560ef58b7a
        "#};

        assert_eq!(
            ProbeInfo::from_export(output),
            ProbeInfo {
                uuid: Some("f4c40183-0a2d-4d97-b71e-25a4043ce01f".into()),
                fs_type: Some("ext4".into()),
            }
        );
    }

    #[test]
    fn test_from_export_whole_disk() {
        // A partitioned disk only reports the partition table
        let output = indoc::indoc! {r#"
            DEVNAME=/dev/sda
            PTUUID=fc6eb27a-2dfa-4acb-b5d6-7c5e1c821b71
            PTTYPE=gpt
        "#};

        assert_eq!(ProbeInfo::from_export(output), ProbeInfo::default());
        assert_eq!(ProbeInfo::from_export(""), ProbeInfo::default());
    }

    #[test]
    fn test_from_export_swap_and_escapes() {
        let output = indoc::indoc! {r#"
            DEVNAME=/dev/sda3
            LABEL=my\ swap
            UUID=3333-CCCC
            TYPE=swap
            VERSION=
        "#};

        let tags = parse_export_output(output);
        assert_eq!(tags.get("LABEL").unwrap(), "my swap");
        assert!(!tags.contains_key("VERSION"));

        let info = ProbeInfo::from_export(output);
        assert_eq!(info.uuid.as_deref(), Some("3333-CCCC"));
        assert_eq!(info.fs_type.as_deref(), Some("swap"));
    }
}
