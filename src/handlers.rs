use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::actions::{Action, Selection};
use crate::config::Config;
use crate::picker;
use crate::runner::CommandRunner;
use crate::session::{self, Session, SessionStore};
use crate::tmux::{self, LiveState, Lookup, SessionFilter, TmuxClient, BOOT_SESSION_NAME};

/// Whether the switcher should show the picker again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Done,
    Reopen,
}

/// Interactive session switcher: pick, then switch / restore / create / delete
pub struct Switcher<'a> {
    config: &'a Config,
    store: &'a SessionStore,
    /// Read side of tmux
    live: &'a dyn LiveState,
    /// Builds the mutating commands handed to `runner`
    client: TmuxClient,
    filter: SessionFilter,
    runner: &'a mut dyn CommandRunner,
}

impl<'a> Switcher<'a> {
    pub fn new(
        config: &'a Config,
        store: &'a SessionStore,
        live: &'a dyn LiveState,
        filter: SessionFilter,
        runner: &'a mut dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            store,
            live,
            client: TmuxClient::new(),
            filter,
            runner,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            let sessions = self.merged_sessions()?;
            let selection = picker::pick_session(&sessions, self.config)?;
            if self.handle(selection, sessions)? == Flow::Done {
                return Ok(());
            }
        }
    }

    /// Live sessions first, then stored sessions not currently running
    fn merged_sessions(&self) -> Result<Vec<Session>> {
        let stored = self.store.load().context("Failed to load saved sessions")?;
        let live = self
            .live
            .list_sessions(&self.filter)
            .context("Failed to list tmux sessions")?;
        Ok(session::combine(live, stored))
    }

    fn handle(&mut self, selection: Selection, sessions: Vec<Session>) -> Result<Flow> {
        match selection {
            Selection::Cancelled => Ok(Flow::Done),
            Selection::Session(name) => self.open(Lookup::Name(&name), &sessions),
            Selection::Path(path) => self.open(Lookup::Path(&path), &sessions),
            Selection::Action { action, arg } => match action {
                Action::New => {
                    let cwd = std::env::current_dir().context("Failed to read current directory")?;
                    self.create(&cwd.to_string_lossy(), &sessions)?;
                    self.leave_boot_session()?;
                    Ok(Flow::Done)
                }
                Action::Delete => {
                    self.delete(&arg, &sessions)?;
                    Ok(Flow::Reopen)
                }
                Action::Interactive => match picker::pick_directory(self.config)? {
                    Selection::Path(path) => self.open(Lookup::Path(&path), &sessions),
                    _ => Ok(Flow::Reopen),
                },
                Action::Save => {
                    self.store.save(&sessions)?;
                    Ok(Flow::Reopen)
                }
                Action::Return => Ok(Flow::Reopen),
            },
        }
    }

    /// Switch to a live match, else restore a saved one, else start fresh
    fn open(&mut self, lookup: Lookup<'_>, sessions: &[Session]) -> Result<Flow> {
        if let Some(name) = self.live.find_live_session(lookup)? {
            self.runner.run(&self.client.switch_client(&name))?;
            self.leave_boot_session()?;
            return Ok(Flow::Done);
        }

        let (identifier, saved) = match lookup {
            Lookup::Name(name) => (name, session::find_by_name(name, sessions)),
            Lookup::Path(path) => (path, session::find_by_path(path, sessions)),
        };

        match saved {
            Ok(saved) => {
                info!(session = %saved.name, "restoring saved session");
                tmux::restore(saved, self.config, &self.client, &mut *self.runner)
                    .with_context(|| format!("Failed to restore session '{}'", saved.name))?;
                self.persist(sessions)?;
            }
            Err(_) => self.create(identifier, sessions)?,
        }
        self.leave_boot_session()?;
        Ok(Flow::Done)
    }

    /// Create, focus and persist a new session rooted at `path`
    fn create(&mut self, path: &str, sessions: &[Session]) -> Result<()> {
        let live_state = self.live;
        let name = session::unique_session_name(path, |candidate| {
            let live = live_state.find_live_session(Lookup::Name(candidate))?.is_some();
            Ok(live || session::exists(candidate, sessions))
        })?;

        info!(session = %name, path, "creating session");
        self.runner.run(&self.client.new_session(&name, path))?;
        self.runner.run(&self.client.switch_client(&name))?;
        self.persist(sessions)
    }

    /// Forget a session on disk and kill it in tmux
    fn delete(&mut self, name: &str, sessions: &[Session]) -> Result<()> {
        let remaining = if session::exists(name, sessions) {
            session::delete(name, sessions)?
        } else {
            sessions.to_vec()
        };

        if let Some(live) = self.live.find_live_session(Lookup::Name(name))? {
            self.runner.run(&self.client.kill_session(&live))?;
        }

        if remaining.is_empty() {
            self.store.clear()?;
        } else {
            self.store.save(&remaining)?;
        }
        info!(session = %name, "deleted session");
        Ok(())
    }

    /// Re-read live state and save it merged over `sessions`
    fn persist(&self, sessions: &[Session]) -> Result<()> {
        let live = self.live.list_sessions(&self.filter)?;
        let merged = session::combine(live, sessions.to_vec());
        self.store.save(&merged)?;
        Ok(())
    }

    /// The bootstrap session only exists to host the first switcher run
    fn leave_boot_session(&mut self) -> Result<()> {
        if !self.config.kill_boot_session {
            return Ok(());
        }
        if let Some(name) = self.live.find_live_session(Lookup::Name(BOOT_SESSION_NAME))? {
            if let Err(e) = self.runner.run(&self.client.kill_session(&name)) {
                warn!("Failed to kill boot session: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RecordingRunner;
    use crate::session::{Pane, Window};
    use crate::tmux::ReportSnapshot;

    const HOME: &str = "/home/u";

    fn stored_web() -> Session {
        let mut web = Session::new("web", "/srv/web");
        web.windows.push(Window {
            index: "1".into(),
            panes: vec![Pane {
                command: "zsh".into(),
                current_path: "/srv/web".into(),
                index: "1".into(),
            }],
        });
        web
    }

    fn config() -> Config {
        Config {
            select_first: false,
            ..Config::default()
        }
    }

    /// Run one picker selection against canned tmux state
    fn handle(
        live: &ReportSnapshot,
        store: &SessionStore,
        config: &Config,
        sessions: Vec<Session>,
        selection: Selection,
    ) -> (Flow, Vec<String>) {
        let mut runner = RecordingRunner::new();
        let flow = {
            let mut switcher =
                Switcher::new(config, store, live, SessionFilter::new(HOME), &mut runner);
            switcher.handle(selection, sessions).unwrap()
        };
        (flow, runner.lines())
    }

    fn temp_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("sessions.yaml"))
    }

    #[test]
    fn test_live_match_switches() {
        let dir = tempfile::tempdir().unwrap();
        let live = ReportSnapshot::new("api|/srv/api|1|1|zsh|/srv/api", "api|/srv/api");

        let (flow, lines) = handle(
            &live,
            &temp_store(&dir),
            &config(),
            vec![Session::new("api", "/srv/api")],
            Selection::Session("api".into()),
        );

        assert_eq!(flow, Flow::Done);
        assert_eq!(lines, ["tmux switch-client -t api"]);
    }

    #[test]
    fn test_stored_name_restores_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        let (flow, lines) = handle(
            &ReportSnapshot::default(),
            &store,
            &config(),
            vec![stored_web()],
            Selection::Session("web".into()),
        );

        assert_eq!(flow, Flow::Done);
        assert_eq!(
            lines,
            [
                "tmux new-session -d -s web -c /srv/web",
                "tmux switch-client -t web",
                "tmux send-keys -t web:1.1 cd /srv/web C-m",
            ]
        );
        assert_eq!(store.load().unwrap(), vec![stored_web()]);
    }

    #[test]
    fn test_stored_path_restores() {
        let dir = tempfile::tempdir().unwrap();

        let (_, lines) = handle(
            &ReportSnapshot::default(),
            &temp_store(&dir),
            &config(),
            vec![stored_web()],
            Selection::Path("/srv/web".into()),
        );

        assert_eq!(lines[0], "tmux new-session -d -s web -c /srv/web");
    }

    #[test]
    fn test_miss_creates_session_with_unique_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        let taken = Session::new("app", "/elsewhere/app");

        let (flow, lines) = handle(
            &ReportSnapshot::default(),
            &store,
            &config(),
            vec![taken.clone()],
            Selection::Path("/srv/new/app".into()),
        );

        assert_eq!(flow, Flow::Done);
        assert_eq!(
            lines,
            [
                "tmux new-session -d -s new-app -c /srv/new/app",
                "tmux switch-client -t new-app",
            ]
        );
        assert_eq!(store.load().unwrap(), vec![taken]);
    }

    #[test]
    fn test_new_session_leaves_boot_session() {
        let dir = tempfile::tempdir().unwrap();
        let live = ReportSnapshot::new("", format!("{BOOT_SESSION_NAME}|{HOME}"));
        let new = Selection::Action {
            action: Action::New,
            arg: String::new(),
        };

        let (flow, lines) = handle(&live, &temp_store(&dir), &config(), Vec::new(), new.clone());

        assert_eq!(flow, Flow::Done);
        assert!(lines[0].starts_with("tmux new-session -d -s "));
        assert!(lines[1].starts_with("tmux switch-client -t "));
        assert_eq!(lines.last().unwrap(), "tmux kill-session -t tmux-keeper-startup");

        let keep = Config {
            kill_boot_session: false,
            ..config()
        };
        let (_, lines) = handle(&live, &temp_store(&dir), &keep, Vec::new(), new);
        assert!(lines.iter().all(|l| !l.contains("kill-session")));
    }

    #[test]
    fn test_switching_from_boot_session_kills_it() {
        let dir = tempfile::tempdir().unwrap();
        let live = ReportSnapshot::new("", format!("api|/srv/api\n{BOOT_SESSION_NAME}|{HOME}"));

        let (_, lines) = handle(
            &live,
            &temp_store(&dir),
            &config(),
            Vec::new(),
            Selection::Session("api".into()),
        );

        assert_eq!(
            lines,
            [
                "tmux switch-client -t api",
                "tmux kill-session -t tmux-keeper-startup",
            ]
        );
    }

    #[test]
    fn test_delete_last_session_clears_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        let only = vec![Session::new("only", "/srv/only")];
        store.save(&only).unwrap();
        let live = ReportSnapshot::new("", "only|/srv/only");

        let (flow, lines) = handle(
            &live,
            &store,
            &config(),
            only,
            Selection::Action {
                action: Action::Delete,
                arg: "only".into(),
            },
        );

        assert_eq!(flow, Flow::Reopen);
        assert_eq!(lines, ["tmux kill-session -t only"]);
        assert!(store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_delete_keeps_other_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        let sessions = vec![Session::new("a", "/a"), Session::new("b", "/b")];

        handle(
            &ReportSnapshot::default(),
            &store,
            &config(),
            sessions,
            Selection::Action {
                action: Action::Delete,
                arg: "a".into(),
            },
        );

        assert_eq!(store.load().unwrap(), vec![Session::new("b", "/b")]);
    }

    #[test]
    fn test_delete_missing_target_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        let sessions = vec![Session::new("a", "/a"), Session::new("b", "/b")];
        store.save(&sessions).unwrap();

        let (flow, lines) = handle(
            &ReportSnapshot::default(),
            &store,
            &config(),
            sessions.clone(),
            Selection::Action {
                action: Action::Delete,
                arg: "zzz".into(),
            },
        );

        assert_eq!(flow, Flow::Reopen);
        assert!(lines.is_empty());
        assert_eq!(store.load().unwrap(), sessions);
    }

    #[test]
    fn test_save_action_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        let (flow, _) = handle(
            &ReportSnapshot::default(),
            &store,
            &config(),
            vec![stored_web()],
            Selection::Action {
                action: Action::Save,
                arg: String::new(),
            },
        );

        assert_eq!(flow, Flow::Reopen);
        assert_eq!(store.load().unwrap(), vec![stored_web()]);
    }

    #[test]
    fn test_cancel_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        let (flow, lines) = handle(
            &ReportSnapshot::default(),
            &store,
            &config(),
            vec![stored_web()],
            Selection::Cancelled,
        );

        assert_eq!(flow, Flow::Done);
        assert!(lines.is_empty());
        assert!(!store.path().exists());
    }
}
