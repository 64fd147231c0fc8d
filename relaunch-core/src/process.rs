//! Capability for invoking external programs.
//!
//! The build toolchain and the cloud-provider CLIs are opaque collaborators.
//! Every step that needs one takes a [`CommandRunner`] so tests can substitute
//! a fake and never spawn real processes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::RunError;

/// A program invocation: program, arguments, optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a program finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExitOutcome {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status (`exit code 2`, `terminated by signal`).
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }

    /// Last `lines` non-empty lines of stderr, for compact diagnostics.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// Runs a program to completion and reports how it exited.
///
/// Implementations block until the program finishes. They do not apply their
/// own timeout.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ExitOutcome, RunError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, spec: &CommandSpec) -> Result<ExitOutcome, RunError> {
        (**self).run(spec)
    }
}

/// Production runner backed by `std::process::Command`, output captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ExitOutcome, RunError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!("exec: {spec}");
        let output = cmd.output().map_err(|source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let outcome = ExitOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        for line in outcome.stderr.lines() {
            tracing::trace!("{}: {line}", spec.program);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_display_joins_args() {
        let spec = CommandSpec::new("aws").args(["s3api", "list-objects-v2"]);
        assert_eq!(spec.to_string(), "aws s3api list-objects-v2");
    }

    #[test]
    fn outcome_success_requires_zero() {
        let ok = ExitOutcome { code: Some(0), ..Default::default() };
        let bad = ExitOutcome { code: Some(1), ..Default::default() };
        let killed = ExitOutcome { code: None, ..Default::default() };
        assert!(ok.success());
        assert!(!bad.success());
        assert!(!killed.success());
        assert_eq!(killed.status_label(), "terminated by signal");
    }

    #[test]
    fn stderr_tail_keeps_last_non_empty_lines() {
        let outcome = ExitOutcome {
            code: Some(1),
            stdout: String::new(),
            stderr: "one\n\ntwo\nthree\n\n".to_string(),
        };
        assert_eq!(outcome.stderr_tail(2), "two\nthree");
        assert_eq!(outcome.stderr_tail(10), "one\ntwo\nthree");
    }

    #[test]
    fn system_runner_reports_missing_program_as_spawn_error() {
        let spec = CommandSpec::new("relaunch-definitely-not-a-real-program");
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }
}
