//! Execution seam for every command that mutates tmux.
//!
//! `OsRunner` spawns the process; `RecordingRunner` keeps the invocations
//! so the exact restore sequence can be asserted without a tmux server.

use std::fmt;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

/// A program plus its arguments, not yet executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Hand the terminal to the child (attach needs this)
    pub interactive: bool,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            interactive: false,
        }
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()>;
}

/// Runs invocations for real, waiting for each to exit
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRunner;

impl CommandRunner for OsRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        debug!(command = %invocation, "running");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);

        if invocation.interactive {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            let status = command.status().map_err(|e| Error::Command {
                command: invocation.to_string(),
                message: e.to_string(),
            })?;
            if !status.success() {
                return Err(Error::Command {
                    command: invocation.to_string(),
                    message: status.to_string(),
                });
            }
            return Ok(());
        }

        let output = command.stdin(Stdio::null()).output().map_err(|e| Error::Command {
            command: invocation.to_string(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Command {
                command: invocation.to_string(),
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

/// Records invocations instead of executing them
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub executed: Vec<Invocation>,
    fail_at: Option<usize>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th (0-based) invocation, recording nothing past it
    pub fn failing_at(n: usize) -> Self {
        Self {
            executed: Vec::new(),
            fail_at: Some(n),
        }
    }

    /// Recorded invocations rendered as command lines
    pub fn lines(&self) -> Vec<String> {
        self.executed.iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        if self.fail_at == Some(self.executed.len()) {
            return Err(Error::Command {
                command: invocation.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.executed.push(invocation.clone());
        Ok(())
    }
}
