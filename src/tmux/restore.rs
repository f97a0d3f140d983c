//! Replays a persisted session topology into tmux from scratch.
//!
//! Targets are recomputed from list position (1-based) rather than taken
//! from the stored `index` fields, which reflect tmux numbering at capture
//! time and may be stale.

use tracing::{debug, info};

use super::TmuxClient;
use crate::config::Config;
use crate::error::Result;
use crate::runner::{CommandRunner, Invocation};
use crate::session::{Pane, Session};

const EDITOR_PROGRAM: &str = "nvim";

/// The full command sequence that recreates `session`, in execution order
pub fn plan_restore(session: &Session, config: &Config, client: &TmuxClient) -> Vec<Invocation> {
    let name = session.name.as_str();
    let mut plan = vec![
        client.new_session(name, &session.current_path),
        client.switch_client(name),
    ];

    for (i, window) in session.windows.iter().enumerate() {
        let window_no = i + 1;

        // Window 1 already exists as a side effect of new-session
        if i > 0 {
            let directory = window
                .panes
                .first()
                .map(|p| p.current_path.as_str())
                .unwrap_or(session.current_path.as_str());
            plan.push(client.new_window(&format!("{name}:{window_no}"), directory));
        }

        for (j, pane) in window.panes.iter().enumerate() {
            let pane_target = format!("{name}:{window_no}.{}", j + 1);

            if j == 0 {
                if i == 0 {
                    // new-session only sets the session directory, not the pane's
                    let cd = format!("cd {}", shell_quote(&pane.current_path));
                    plan.push(client.send_keys(&pane_target, &cd));
                }
            } else {
                let previous = format!("{name}:{window_no}.{j}");
                plan.push(client.split_window(&previous, &pane.current_path));
            }

            if let Some(keys) = relaunch_keys(pane, config) {
                plan.push(client.send_keys(&pane_target, keys));
            }
        }

        if config.select_first {
            plan.push(client.select_window(&format!("{name}:1")));
        }
    }

    plan
}

/// Recreate `session` through `runner`, stopping at the first failed command.
///
/// Nothing is rolled back: windows created before the failure stay alive.
pub fn restore(
    session: &Session,
    config: &Config,
    client: &TmuxClient,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    let plan = plan_restore(session, config, client);
    debug!(session = %session.name, steps = plan.len(), "restoring session");

    for invocation in &plan {
        runner.run(invocation)?;
    }

    info!(session = %session.name, windows = session.windows.len(), "restored session");
    Ok(())
}

/// Keys that re-launch the pane's program, if it is whitelisted
fn relaunch_keys<'a>(pane: &'a Pane, config: &'a Config) -> Option<&'a str> {
    if !config.whitelisted(&pane.command) {
        return None;
    }
    if pane.command == EDITOR_PROGRAM && !config.nvim_custom_command.is_empty() {
        return Some(config.nvim_custom_command.as_str());
    }
    Some(pane.command.as_str())
}

/// Quote a path for typing into a shell prompt
fn shell_quote(path: &str) -> String {
    let safe = path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-~+".contains(c));
    if safe && !path.is_empty() {
        path.to_string()
    } else {
        format!("'{}'", path.replace('\'', r"'\''"))
    }
}
