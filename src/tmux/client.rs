use std::process::{Command, Output, Stdio};

use tracing::debug;

use super::live::LiveState;
use super::parser::{
    find_in_session_report, parse_pane_report, Lookup, SessionFilter, PANE_REPORT_FORMAT,
    SESSION_REPORT_FORMAT,
};
use crate::error::{Error, Result};
use crate::runner::Invocation;
use crate::session::Session;

/// Client for interacting with tmux via CLI.
///
/// Queries go through [`LiveState`]; anything that changes tmux state is returned as an
/// [`Invocation`] for a [`crate::runner::CommandRunner`] to execute.
#[derive(Debug, Clone)]
pub struct TmuxClient {
    /// Path to tmux binary
    tmux_path: String,
}

impl TmuxClient {
    pub fn new() -> Self {
        Self {
            tmux_path: "tmux".to_string(),
        }
    }

    /// Check if tmux server is running
    pub fn is_server_running(&self) -> bool {
        Command::new(&self.tmux_path)
            .arg("list-sessions")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    pub fn new_session(&self, name: &str, directory: &str) -> Invocation {
        self.invocation(["new-session", "-d", "-s", name, "-c", directory])
    }

    /// Detached session whose only pane runs `program`
    pub fn new_boot_session(&self, name: &str, program: &str) -> Invocation {
        self.invocation(["new-session", "-d", "-s", name, program])
    }

    pub fn switch_client(&self, name: &str) -> Invocation {
        self.invocation(["switch-client", "-t", name])
    }

    /// Attach the current terminal; `None` attaches to the most recent session
    pub fn attach(&self, name: Option<&str>) -> Invocation {
        let invocation = match name {
            Some(name) => self.invocation(["attach-session", "-t", name]),
            None => self.invocation(["attach-session"]),
        };
        invocation.interactive()
    }

    pub fn new_window(&self, target: &str, directory: &str) -> Invocation {
        self.invocation(["new-window", "-t", target, "-c", directory])
    }

    pub fn split_window(&self, target: &str, directory: &str) -> Invocation {
        self.invocation(["split-window", "-t", target, "-c", directory])
    }

    /// Type `keys` into `target` followed by Enter
    pub fn send_keys(&self, target: &str, keys: &str) -> Invocation {
        self.invocation(["send-keys", "-t", target, keys, "C-m"])
    }

    pub fn select_window(&self, target: &str) -> Invocation {
        self.invocation(["select-window", "-t", target])
    }

    pub fn kill_session(&self, name: &str) -> Invocation {
        self.invocation(["kill-session", "-t", name])
    }

    pub fn display_message(&self, message: &str) -> Invocation {
        self.invocation(["display-message", message])
    }

    fn invocation<const N: usize>(&self, args: [&str; N]) -> Invocation {
        Invocation::new(self.tmux_path.as_str(), args)
    }

    fn query(&self, args: &[&str]) -> Result<Output> {
        Command::new(&self.tmux_path)
            .args(args)
            .output()
            .map_err(|e| Error::Command {
                command: self.command_line(args),
                message: e.to_string(),
            })
    }

    /// Stdout of a report query, or `None` when no server is running
    fn report(&self, args: &[&str]) -> Result<Option<String>> {
        let output = self.query(args)?;
        if output.status.success() {
            return Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_no_server(&stderr) {
            return Ok(None);
        }
        Err(self.failure(args, &output))
    }

    fn failure(&self, args: &[&str], output: &Output) -> Error {
        Error::Command {
            command: self.command_line(args),
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }
    }

    fn command_line(&self, args: &[&str]) -> String {
        std::iter::once(self.tmux_path.as_str())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl LiveState for TmuxClient {
    /// Exit status 1 is how tmux says "no server"; anything above is an error.
    fn has_sessions(&self) -> Result<bool> {
        let output = self.query(&["list-sessions"])?;
        match output.status.code() {
            Some(0) => Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty()),
            Some(1) => Ok(false),
            _ => Err(self.failure(&["list-sessions"], &output)),
        }
    }

    fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let args = ["list-panes", "-a", "-F", PANE_REPORT_FORMAT];
        let Some(report) = self.report(&args)? else {
            debug!("no tmux server running");
            return Ok(Vec::new());
        };
        Ok(parse_pane_report(&report, filter))
    }

    fn find_live_session(&self, lookup: Lookup<'_>) -> Result<Option<String>> {
        let args = ["list-sessions", "-F", SESSION_REPORT_FORMAT];
        Ok(self
            .report(&args)?
            .and_then(|report| find_in_session_report(&report, lookup)))
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new()
    }
}

/// tmux's ways of saying the server is simply not started
fn is_no_server(stderr: &str) -> bool {
    stderr.contains("no server running")
        || stderr.contains("no sessions")
        || stderr.contains("error connecting to")
}
