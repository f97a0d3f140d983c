//! fzf and zoxide front-ends. Both run as child processes owning the terminal.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

use crate::actions::{Action, Selection};
use crate::config::Config;
use crate::session::Session;

/// fzf exit status when the user aborts with Esc / Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;
/// fzf exit status when nothing matched
const EXIT_NO_MATCH: i32 = 1;

/// Arguments passed to fzf for the session switcher
pub fn fzf_args(config: &Config) -> Vec<String> {
    let bindings = [
        (&config.fzf_bind_new, Action::New),
        (&config.fzf_bind_delete, Action::Delete),
        (&config.fzf_bind_interactive, Action::Interactive),
        (&config.fzf_bind_save, Action::Save),
    ];

    let mut args: Vec<String> = config.fzf_opts.split_whitespace().map(String::from).collect();
    for (key, action) in &bindings {
        args.push(format!("--bind={}:become(echo '{}:{{}}')", key, action.token()));
    }
    args.push("--prompt".to_string());
    args.push(config.fzf_prompt.clone());
    args.push("--header".to_string());
    args.push(format!(
        "<{}>: new session\n<{}>: delete session\n<{}>: interactive search\n<{}>: save sessions",
        config.fzf_bind_new, config.fzf_bind_delete, config.fzf_bind_interactive, config.fzf_bind_save
    ));
    args
}

/// Show session names in fzf and return the user's choice
pub fn pick_session(sessions: &[Session], config: &Config) -> Result<Selection> {
    let entries = sessions
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut child = Command::new("fzf")
        .args(fzf_args(config))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .context("Failed to start fzf")?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(entries.as_bytes())
            .context("Failed to write sessions to fzf")?;
    }

    let output = child.wait_with_output().context("Failed to wait for fzf")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    debug!(status = %output.status, "fzf exited");

    match output.status.code() {
        Some(0) => Ok(Selection::parse(&stdout)),
        Some(EXIT_NO_MATCH) | Some(EXIT_INTERRUPTED) => Ok(Selection::Cancelled),
        _ => anyhow::bail!("fzf command failed: {}", output.status),
    }
}

/// Let the user pick a directory with `zoxide query -i`
pub fn pick_directory(config: &Config) -> Result<Selection> {
    let output = Command::new("zoxide")
        .args(["query", "-i"])
        .env("_ZO_FZF_OPTS", &config.zoxide_opts)
        .stdin(Stdio::inherit())
        .stderr(Stdio::inherit())
        .output()
        .context("Failed to start zoxide")?;

    match output.status.code() {
        Some(0) => {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if path.is_empty() {
                Ok(Selection::Action {
                    action: Action::Return,
                    arg: String::new(),
                })
            } else {
                Ok(Selection::Path(path))
            }
        }
        Some(EXIT_INTERRUPTED) => Ok(Selection::Action {
            action: Action::Return,
            arg: String::new(),
        }),
        _ => anyhow::bail!("zoxide command failed: {}", output.status),
    }
}
