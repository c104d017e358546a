use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::{audit::ComparisonMode, report::OutputFormat, CHKUUID_VERSION, DEFAULT_FSTAB_PATH};

/// Checks that the UUID and PARTUUID references in the static mount table
/// match the partitions on this system and where they are mounted.
#[derive(Parser, Debug)]
#[clap(version = CHKUUID_VERSION)]
pub struct Cli {
    /// Logging verbosity [OFF, ERROR, WARN, INFO, DEBUG, TRACE]
    #[arg(short, long, default_value_t = LevelFilter::Warn)]
    pub verbosity: LevelFilter,

    /// Static mount table to check against
    #[arg(long, default_value = DEFAULT_FSTAB_PATH)]
    pub fstab: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Require table identifiers to equal the partition UUID instead of
    /// starting with it
    #[arg(long)]
    pub exact: bool,

    /// Run without root privileges
    #[arg(long)]
    pub skip_root_check: bool,
}

impl Cli {
    pub fn comparison_mode(&self) -> ComparisonMode {
        if self.exact {
            ComparisonMode::Exact
        } else {
            ComparisonMode::Prefix
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["chkuuid"]).unwrap();
        assert_eq!(cli.verbosity, LevelFilter::Warn);
        assert_eq!(cli.fstab, PathBuf::from("/etc/fstab"));
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(!cli.no_color);
        assert!(!cli.skip_root_check);
        assert_eq!(cli.comparison_mode(), ComparisonMode::Prefix);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "chkuuid",
            "-v",
            "trace",
            "--fstab",
            "/tmp/fstab",
            "--output",
            "json",
            "--no-color",
            "--exact",
            "--skip-root-check",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, LevelFilter::Trace);
        assert_eq!(cli.fstab, PathBuf::from("/tmp/fstab"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.no_color);
        assert!(cli.skip_root_check);
        assert_eq!(cli.comparison_mode(), ComparisonMode::Exact);

        assert!(Cli::try_parse_from(["chkuuid", "--output", "yaml"]).is_err());
    }
}
