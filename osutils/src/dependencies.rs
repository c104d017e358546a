//! Runner for the system tools that block device and mount information is
//! read from.
//!
//! Every tool is looked up in `$PATH` before it runs. Each invocation is
//! traced with its full command line, and a failure carries the command line,
//! the exit status and whatever the tool printed.

use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    io,
    os::unix::process::ExitStatusExt,
    process::{Command as StdCommand, ExitStatus},
};

use log::trace;
use strum_macros::IntoStaticStr;

#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error("Could not find '{dependency}' in $PATH: {source}")]
    NotFound {
        dependency: Dependency,
        #[source]
        source: which::Error,
    },

    #[error("Could not start '{dependency}': {source}")]
    CouldNotExecute {
        dependency: Dependency,
        #[source]
        source: io::Error,
    },

    #[error("'{command_line}' {status}\n{report}")]
    ExecutionFailed {
        dependency: Dependency,
        command_line: String,
        code: Option<i32>,
        status: String,
        report: String,
    },
}

/// External tools, plus a few harmless ones the tests run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Dependency {
    Blkid,
    Findmnt,
    Lsblk,
    #[cfg(test)]
    DoesNotExist,
    #[cfg(test)]
    Echo,
    #[cfg(test)]
    False,
    #[cfg(test)]
    Sh,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Dependency {
    /// Binary name, e.g. `blkid`.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Starts building an invocation of this tool.
    pub fn cmd(&self) -> Command {
        Command {
            dependency: *self,
            args: Vec::new(),
        }
    }
}

pub struct Command {
    dependency: Dependency,
    args: Vec<OsString>,
}

impl Command {
    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    /// Command line as it would be typed in a shell. Arguments with spaces
    /// are single-quoted.
    pub fn command_line(&self) -> String {
        std::iter::once(Cow::Borrowed(self.dependency.name()))
            .chain(self.args.iter().map(|arg| {
                let arg = arg.to_string_lossy();
                if arg.contains(' ') {
                    Cow::Owned(format!("'{arg}'"))
                } else {
                    arg
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the tool to completion, whatever its exit status.
    pub fn output(&self) -> Result<CommandOutput, Box<DependencyError>> {
        let path = which::which(self.dependency.name()).map_err(|source| {
            Box::new(DependencyError::NotFound {
                dependency: self.dependency,
                source,
            })
        })?;

        let command_line = self.command_line();
        trace!("Executing '{command_line}'");
        let output = StdCommand::new(path)
            .args(&self.args)
            .output()
            .map_err(|source| DependencyError::CouldNotExecute {
                dependency: self.dependency,
                source,
            })?;

        let output = CommandOutput {
            dependency: self.dependency,
            command_line,
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(
            "'{}' {}. Report:\n{}",
            output.command_line,
            output.describe_status(),
            output.report()
        );
        Ok(output)
    }

    /// Runs the tool and returns its stdout if it exited successfully.
    pub fn output_and_check(&self) -> Result<String, Box<DependencyError>> {
        let output = self.output()?;
        output.check()?;
        Ok(output.stdout)
    }
}

#[derive(Debug)]
pub struct CommandOutput {
    dependency: Dependency,
    command_line: String,
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    /// Exit code, if the tool exited normally.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Both output streams, labeled. Empty if the tool printed nothing.
    pub fn report(&self) -> String {
        [("stdout", &self.stdout), ("stderr", &self.stderr)]
            .into_iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(label, text)| format!("{label}:\n{text}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn describe_status(&self) -> String {
        match (self.status.code(), self.status.signal()) {
            (Some(code), _) => format!("exited with status {code}"),
            (None, Some(signal)) => format!("was terminated by signal {signal}"),
            (None, None) => "exited with an unknown status".into(),
        }
    }

    /// Fails unless the tool exited with status 0.
    pub fn check(&self) -> Result<(), Box<DependencyError>> {
        if self.status.success() {
            return Ok(());
        }

        let report = self.report();
        Err(Box::new(DependencyError::ExecutionFailed {
            dependency: self.dependency,
            command_line: self.command_line.clone(),
            code: self.code(),
            status: self.describe_status(),
            report: if report.is_empty() {
                "(no output collected)".into()
            } else {
                report
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        assert_eq!(
            Dependency::Lsblk
                .cmd()
                .args(["--json", "--list"])
                .arg("--paths")
                .command_line(),
            "lsblk --json --list --paths"
        );
        assert_eq!(
            Dependency::Blkid
                .cmd()
                .arg("/dev/disk/by-label/my disk")
                .command_line(),
            "blkid '/dev/disk/by-label/my disk'"
        );
        assert_eq!(Dependency::Findmnt.cmd().command_line(), "findmnt");
    }

    #[test]
    fn test_output_and_check() {
        assert_eq!(
            Dependency::Echo
                .cmd()
                .arg("Hello, world")
                .output_and_check()
                .unwrap(),
            "Hello, world\n"
        );

        let err = Dependency::False.cmd().output_and_check().unwrap_err();
        assert!(matches!(*err, DependencyError::ExecutionFailed { code: Some(1), .. }));
        assert_eq!(
            err.to_string(),
            "'false' exited with status 1\n(no output collected)"
        );
    }

    #[test]
    fn test_missing_dependency() {
        let err = Dependency::DoesNotExist.cmd().output().unwrap_err();
        assert!(matches!(*err, DependencyError::NotFound { .. }));
        assert!(err
            .to_string()
            .starts_with("Could not find 'doesnotexist' in $PATH"));
    }

    #[test]
    fn test_command_output() {
        let output = Dependency::Sh
            .cmd()
            .args(["-c", "echo out; echo err >&2; exit 2"])
            .output()
            .unwrap();
        assert_eq!(output.code(), Some(2));
        assert_eq!(output.stdout(), "out\n");
        assert_eq!(output.report(), "stdout:\nout\n\nstderr:\nerr\n");
        assert_eq!(output.describe_status(), "exited with status 2");
        assert!(output.check().is_err());

        let output = Dependency::Echo.cmd().output().unwrap();
        assert_eq!(output.code(), Some(0));
        output.check().unwrap();
    }
}
