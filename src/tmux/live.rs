//! Read side of tmux, behind a trait so flows can run against canned reports.

use super::parser::{find_in_session_report, parse_pane_report, Lookup, SessionFilter};
use crate::error::Result;
use crate::session::Session;

/// Queries about what tmux is currently running
pub trait LiveState {
    /// Every live session with its window/pane topology
    fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>>;

    /// Name of the live session matching `lookup`, if any
    fn find_live_session(&self, lookup: Lookup<'_>) -> Result<Option<String>>;

    /// Whether tmux reports at least one session
    fn has_sessions(&self) -> Result<bool>;
}

/// Fixed tmux reports, answered with the same parsers the real client uses
#[derive(Debug, Clone, Default)]
pub struct ReportSnapshot {
    /// `list-panes -a` output
    pub pane_report: String,
    /// `list-sessions` output (`name|path` per line)
    pub session_report: String,
}

impl ReportSnapshot {
    pub fn new(pane_report: impl Into<String>, session_report: impl Into<String>) -> Self {
        Self {
            pane_report: pane_report.into(),
            session_report: session_report.into(),
        }
    }
}

impl LiveState for ReportSnapshot {
    fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        Ok(parse_pane_report(&self.pane_report, filter))
    }

    fn find_live_session(&self, lookup: Lookup<'_>) -> Result<Option<String>> {
        Ok(find_in_session_report(&self.session_report, lookup))
    }

    fn has_sessions(&self) -> Result<bool> {
        Ok(!self.session_report.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_answers_from_reports() {
        let live = ReportSnapshot::new("api|/srv/api|1|1|zsh|/srv/api", "api|/srv/api");
        let sessions = live.list_sessions(&SessionFilter::new("/home/u")).unwrap();

        assert_eq!(sessions.len(), 1);
        assert_eq!(live.find_live_session(Lookup::Path("/srv/api")).unwrap(), Some("api".into()));
        assert!(live.has_sessions().unwrap());
        assert!(!ReportSnapshot::default().has_sessions().unwrap());
    }
}
