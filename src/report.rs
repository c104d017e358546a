//! Rendering of audit results.

use std::io::Write;

use anyhow::{Context, Error};
use owo_colors::{OwoColorize, Style};

use crate::{
    audit::{Classification, ClassificationState},
    CHKUUID_VERSION,
};

const SEPARATOR: &str = "------------------------------------------------------------------------------------------------";
const BANNER_RULE: &str = "-------------------------------";

/// Report output format.
#[derive(clap::ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable table.
    #[default]
    Table,

    /// JSON array of classified partitions.
    Json,
}

pub struct Presenter {
    format: OutputFormat,
    color: bool,
}

impl Presenter {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    /// Writes the full report for `classifications` to `out`.
    pub fn render(
        &self,
        classifications: &[Classification],
        out: &mut impl Write,
    ) -> Result<(), Error> {
        match self.format {
            OutputFormat::Table => self.render_table(classifications, out),
            OutputFormat::Json => render_json(classifications, out),
        }
        .context("Failed to write report")
    }

    fn render_table(
        &self,
        classifications: &[Classification],
        out: &mut impl Write,
    ) -> Result<(), Error> {
        let title = format!("{:>20}", format!("chkuuid {CHKUUID_VERSION}"));
        writeln!(out)?;
        writeln!(out, "{BANNER_RULE}")?;
        writeln!(out, "{}", self.paint(title, Style::new().black().on_cyan()))?;
        writeln!(out, "{BANNER_RULE}")?;
        writeln!(out)?;

        writeln!(
            out,
            "{}",
            self.paint(
                "* The following is a list of partitions, with the UUID tag, \n  \
                 which is tried to be found in the fstab file.\n"
                    .to_string(),
                Style::new().bold().white()
            )
        )?;
        writeln!(
            out,
            "{:<12}{:<40}{:<18}{:<18}{:<18}",
            "PART", "UUID", "FSTAB", "TYPE", "MOUNT"
        )?;
        writeln!(out, "{SEPARATOR}")?;

        for classification in classifications {
            writeln!(out, "{}", self.render_row(classification))?;
        }

        writeln!(out, "End list.")?;
        Ok(())
    }

    /// Renders one table row. Columns are padded before coloring so escape
    /// sequences do not count towards the widths.
    pub fn render_row(&self, classification: &Classification) -> String {
        let partition = &classification.partition;
        let uuid = format!("{:<40}", partition.uuid);
        let state = format!("{:<18}", classification.state.to_string());

        let (uuid, state) = match classification.state {
            ClassificationState::Bad => (
                self.paint(uuid, Style::new().green()),
                self.paint(state, Style::new().red()),
            ),
            ClassificationState::Ok
            | ClassificationState::OkNotMount
            | ClassificationState::NotFound => (uuid, state),
        };

        format!(
            "{:<12}{uuid}{state}{:<18}{:<18}",
            partition.name,
            partition.fs_type,
            partition.mount_point.to_string(),
        )
        .trim_end()
        .to_string()
    }

    fn paint(&self, text: String, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text
        }
    }
}

fn render_json(classifications: &[Classification], out: &mut impl Write) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *out, classifications)?;
    writeln!(out)?;
    Ok(())
}
