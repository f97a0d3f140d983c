//! Parsing of tmux's `-F` format reports into the session model.

use tracing::trace;

use super::BOOT_SESSION_NAME;
use crate::error::{Error, Result};
use crate::session::{Pane, Session, Window};

/// `#{session_name}|#{session_path}|#{window_index}|#{pane_index}|#{pane_current_command}|#{pane_current_path}`
pub const PANE_REPORT_FORMAT: &str = "#{session_name}|#{session_path}|#{window_index}|#{pane_index}|#{pane_current_command}|#{pane_current_path}";

/// `#{session_name}|#{session_path}`
pub const SESSION_REPORT_FORMAT: &str = "#{session_name}|#{session_path}";

const PANE_REPORT_FIELDS: usize = 6;
const SESSION_REPORT_FIELDS: usize = 2;

/// Sessions that carry no project context and are never listed or persisted
#[derive(Debug, Clone)]
pub struct SessionFilter {
    excluded_paths: Vec<String>,
}

impl SessionFilter {
    pub fn new(home_dir: impl Into<String>) -> Self {
        Self {
            excluded_paths: vec![home_dir.into(), "/dev/null".to_string(), "/tmp".to_string()],
        }
    }

    pub fn for_current_user() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        Ok(Self::new(home.to_string_lossy()))
    }

    fn excludes(&self, session_name: &str, session_path: &str) -> bool {
        session_name == BOOT_SESSION_NAME || self.excluded_paths.iter().any(|p| p == session_path)
    }
}

/// Build sessions from a `list-panes -a` report, one line per pane.
///
/// Lines without exactly six fields are dropped. Exclusion is decided per
/// line on that line's session path. Sessions, windows and panes keep the
/// order in which tmux reported them.
pub fn parse_pane_report(report: &str, filter: &SessionFilter) -> Vec<Session> {
    let mut sessions: Vec<Session> = Vec::new();

    for line in report.trim().lines() {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != PANE_REPORT_FIELDS {
            trace!(line, "skipping malformed pane line");
            continue;
        }
        let [session_name, session_path, window_index, pane_index, pane_command, pane_path] =
            [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]];

        if filter.excludes(session_name, session_path) {
            continue;
        }

        let session = match sessions.iter().position(|s| s.name == session_name) {
            Some(i) => &mut sessions[i],
            None => {
                sessions.push(Session::new(session_name, session_path));
                let last = sessions.len() - 1;
                &mut sessions[last]
            }
        };

        let window = match session.windows.iter().position(|w| w.index == window_index) {
            Some(i) => &mut session.windows[i],
            None => {
                session.windows.push(Window {
                    panes: Vec::new(),
                    index: window_index.to_string(),
                });
                let last = session.windows.len() - 1;
                &mut session.windows[last]
            }
        };

        window.panes.push(Pane {
            command: pane_command.to_string(),
            current_path: pane_path.to_string(),
            index: pane_index.to_string(),
        });
    }

    sessions
}

/// How to look a live session up in a `list-sessions` report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Name(&'a str),
    Path(&'a str),
}

/// Return the name of the first session in a 2-field report matching `lookup`
pub fn find_in_session_report(report: &str, lookup: Lookup<'_>) -> Option<String> {
    report.trim().lines().find_map(|line| {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != SESSION_REPORT_FIELDS {
            return None;
        }
        let (name, path) = (fields[0], fields[1]);
        let hit = match lookup {
            Lookup::Name(wanted) => name == wanted,
            Lookup::Path(wanted) => path == wanted,
        };
        hit.then(|| name.to_string())
    })
}
