use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::daemon;
use crate::runner::CommandRunner;
use crate::tmux::{LiveState, TmuxClient, BOOT_SESSION_NAME};

/// Terminal entry point: attach to tmux, starting it with the switcher if idle
pub fn run(config: &Config, live: &dyn LiveState, runner: &mut dyn CommandRunner) -> Result<()> {
    let client = TmuxClient::new();

    if !live.has_sessions()? {
        if config.auto_save {
            daemon::spawn_detached()?;
        }
        let exe = std::env::current_exe().context("could not locate own executable")?;
        let switcher = format!("{} --switcher", exe.display());
        info!(session = BOOT_SESSION_NAME, "starting tmux with the switcher");
        runner.run(&client.new_boot_session(BOOT_SESSION_NAME, &switcher))?;
    }

    runner.run(&client.attach(None))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RecordingRunner;
    use crate::tmux::ReportSnapshot;

    fn config() -> Config {
        Config {
            auto_save: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_idle_tmux_starts_boot_session_then_attaches() {
        let mut runner = RecordingRunner::new();
        run(&config(), &ReportSnapshot::default(), &mut runner).unwrap();

        assert_eq!(runner.executed.len(), 2);
        let boot = &runner.executed[0].args;
        assert_eq!(boot[..4], ["new-session", "-d", "-s", BOOT_SESSION_NAME]);
        assert!(boot[4].ends_with(" --switcher"));
        assert!(!runner.executed[0].interactive);
        assert_eq!(runner.executed[1].args, ["attach-session"]);
        assert!(runner.executed[1].interactive);
    }

    #[test]
    fn test_running_tmux_only_attaches() {
        let live = ReportSnapshot::new("", "api|/srv/api");
        let mut runner = RecordingRunner::new();
        run(&config(), &live, &mut runner).unwrap();

        assert_eq!(runner.lines(), ["tmux attach-session"]);
    }

    #[test]
    fn test_boot_session_failure_skips_attach() {
        let mut runner = RecordingRunner::failing_at(0);
        assert!(run(&config(), &ReportSnapshot::default(), &mut runner).is_err());
        assert!(runner.executed.is_empty());
    }
}
