use std::path::Path;

use anyhow::{Context, Error};

/// A representation of a fstab file, in file order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TabFile {
    pub entries: Vec<TabFileEntry>,
}

/// The first two fields of a single tab file line.
///
/// Only the device specification and the mount point are kept; the
/// filesystem type, options and dump/pass fields are not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabFileEntry {
    /// Raw device specification, e.g. `UUID="f4c4..."`, `LABEL=data` or
    /// `/dev/sda1`. Quotes are kept as written.
    pub spec: String,

    /// Mount point, or `none` for entries that are not mounted on a
    /// directory, such as swap.
    pub target: String,
}

impl TabFile {
    /// Reads and parses the tab file at `tab_file_path`.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn read(tab_file_path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read(tab_file_path.as_ref()).with_context(|| {
            format!(
                "Failed to read static mount table '{}'",
                tab_file_path.as_ref().display()
            )
        })?;

        Ok(Self::parse(&String::from_utf8_lossy(&contents)))
    }

    /// Parses the contents of a tab file.
    ///
    /// Blank lines and comments are skipped. A line with a single field
    /// produces an entry with an empty target.
    pub fn parse(contents: &str) -> Self {
        Self {
            entries: contents.lines().filter_map(TabFileEntry::parse).collect(),
        }
    }
}

impl TabFileEntry {
    fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let mut fields = trimmed.split([' ', '\t']).filter(|f| !f.is_empty());
        let spec = unescape_octal(fields.next()?);
        let target = fields.next().map(unescape_octal).unwrap_or_default();

        Some(Self { spec, target })
    }
}

/// Decodes the `\NNN` octal escapes used by tab files for whitespace and
/// backslashes. Anything that is not a valid three-digit octal escape is
/// kept verbatim.
fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    fn entry(spec: &str, target: &str) -> TabFileEntry {
        TabFileEntry {
            spec: spec.into(),
            target: target.into(),
        }
    }

    #[test]
    fn test_parse() {
        let contents = indoc::indoc! {r#"
            # /etc/fstab: static file system information.
            #
            # <file system>                           <mount point> <type> <options> <dump> <pass>
            UUID=f4c40183-0a2d-4d97-b71e-25a4043ce01f /             ext4   errors=remount-ro 0 1

            UUID="84A0-088E"	/boot/efi	vfat	umask=0077	0	1
              PARTUUID=af002b41-3dbe-4044-82d2-f0560ef58b7a /home ext4 defaults 0 2
            LABEL=data /data xfs defaults 0 2
            /dev/sdb1 /random ext4 defaults 0 2
            UUID=3333-CCCC none swap sw 0 0
            tmpfs /tmp tmpfs defaults 0 0
        "#};

        let tab_file = TabFile::parse(contents);
        assert_eq!(
            tab_file.entries,
            vec![
                entry("UUID=f4c40183-0a2d-4d97-b71e-25a4043ce01f", "/"),
                entry("UUID=\"84A0-088E\"", "/boot/efi"),
                entry("PARTUUID=af002b41-3dbe-4044-82d2-f0560ef58b7a", "/home"),
                entry("LABEL=data", "/data"),
                entry("/dev/sdb1", "/random"),
                entry("UUID=3333-CCCC", "none"),
                entry("tmpfs", "/tmp"),
            ]
        );
    }

    #[test]
    fn test_parse_single_field_and_empty() {
        assert_eq!(
            TabFile::parse("UUID=1111-AAAA\n").entries,
            vec![entry("UUID=1111-AAAA", "")]
        );
        assert!(TabFile::parse("").entries.is_empty());
        assert!(TabFile::parse("   \n\t\n# only comments\n")
            .entries
            .is_empty());
    }

    #[test]
    fn test_unescape_octal() {
        assert_eq!(unescape_octal(r"/mnt/My\040Files"), "/mnt/My Files");
        assert_eq!(unescape_octal(r"/mnt/tab\011here"), "/mnt/tab\there");
        assert_eq!(unescape_octal(r"/mnt/back\134slash"), r"/mnt/back\slash");
        assert_eq!(unescape_octal(r"/mnt/not\08escape"), r"/mnt/not\08escape");
        assert_eq!(unescape_octal(r"/mnt/trailing\04"), r"/mnt/trailing\04");
        assert_eq!(unescape_octal(r"\"), r"\");

        assert_eq!(
            TabFile::parse(r"UUID=1111-AAAA /mnt/My\040Files ext4 defaults 0 2").entries,
            vec![entry("UUID=1111-AAAA", "/mnt/My Files")]
        );
    }

    #[test]
    fn test_read() {
        let mut tmpfile = NamedTempFile::new().unwrap();
        tmpfile
            .write_all(b"UUID=1111-AAAA /home ext4 defaults 0 2\n")
            .unwrap();
        tmpfile.flush().unwrap();

        assert_eq!(
            TabFile::read(tmpfile.path()).unwrap().entries,
            vec![entry("UUID=1111-AAAA", "/home")]
        );

        // non-existing input file
        assert_eq!(
            TabFile::read(Path::new("/does-not-exist"))
                .unwrap_err()
                .to_string(),
            "Failed to read static mount table '/does-not-exist'"
        );
    }

    #[test]
    fn test_read_invalid_utf8() {
        let mut tmpfile = NamedTempFile::new().unwrap();
        tmpfile
            .write_all(b"UUID=1111-AAAA /mnt/caf\xe9 ext4 defaults 0 2\n")
            .unwrap();
        tmpfile
            .write_all(b"UUID=2222-BBBB /home ext4 defaults 0 2\n")
            .unwrap();
        tmpfile.flush().unwrap();

        assert_eq!(
            TabFile::read(tmpfile.path()).unwrap().entries,
            vec![
                entry("UUID=1111-AAAA", "/mnt/caf\u{fffd}"),
                entry("UUID=2222-BBBB", "/home"),
            ]
        );
    }
}
