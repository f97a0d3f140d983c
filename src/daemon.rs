//! Background autosave loop, one instance per user.

use std::fs::{self, File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::config::Config;
use crate::runner::{CommandRunner, OsRunner};
use crate::session::{self, SessionStore};
use crate::tmux::{LiveState, SessionFilter, TmuxClient};

const LOCK_FILE: &str = "tmux-keeper.lock";
const MONITOR_INTERVAL: Duration = Duration::from_secs(10);

/// Exclusive `flock(2)` held for the daemon's lifetime
#[derive(Debug)]
pub struct DaemonLock {
    file: File,
    path: PathBuf,
}

impl DaemonLock {
    /// Take the lock without blocking; fails if another daemon holds it
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("could not create lock directory: {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("could not open lock file: {}", path.display()))?;

        // SAFETY: the fd belongs to `file`, which outlives this call.
        let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if ret != 0 {
            anyhow::bail!("another instance of the daemon is already running");
        }
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// `~/.tmux/tmux-keeper/tmux-keeper.lock`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(home.join(".tmux").join("tmux-keeper").join(LOCK_FILE))
    }
}

impl Drop for DaemonLock {
    fn drop(&mut self) {
        info!(path = %self.path.display(), "releasing daemon lock");
        // SAFETY: the fd is still owned by `self.file`.
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

/// Re-launch this executable detached in daemon mode
pub fn spawn_detached() -> Result<()> {
    let exe = std::env::current_exe().context("could not locate own executable")?;
    std::process::Command::new(exe)
        .arg("--daemon")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .context("failed to start daemon")?;
    Ok(())
}

/// Save periodically until signalled or until the tmux server goes away
pub async fn run(config: &Config, store: SessionStore) -> Result<()> {
    let _lock = DaemonLock::acquire(&DaemonLock::default_path()?)?;
    let client = TmuxClient::new();
    let filter = SessionFilter::for_current_user()?;
    let mut runner = OsRunner;

    let mut sigterm = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut autosave = tokio::time::interval(Duration::from_secs(
        config.auto_save_interval_minutes.max(1) * 60,
    ));
    let mut monitor = tokio::time::interval(MONITOR_INTERVAL);
    // both intervals fire immediately; skip that first tick
    autosave.tick().await;
    monitor.tick().await;

    info!(
        interval_minutes = config.auto_save_interval_minutes,
        "autosave daemon started"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received SIGINT, shutting down daemon");
                return Ok(());
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down daemon");
                return Ok(());
            }
            _ = monitor.tick() => {
                if !client.is_server_running() {
                    info!("tmux server is not running, shutting down daemon");
                    save_sessions(&client, &client, &filter, &store, &mut runner);
                    return Ok(());
                }
            }
            _ = autosave.tick() => {
                save_sessions(&client, &client, &filter, &store, &mut runner);
            }
        }
    }
}

/// One autosave pass; failures are reported in tmux, never fatal
fn save_sessions(
    live: &dyn LiveState,
    client: &TmuxClient,
    filter: &SessionFilter,
    store: &SessionStore,
    runner: &mut dyn CommandRunner,
) {
    let message = match autosave(live, filter, store) {
        Ok(()) => "Sessions saved successfully.".to_string(),
        Err(e) => {
            warn!("autosave failed: {:#}", e);
            format!("Failed to save sessions: {}", e)
        }
    };
    if let Err(e) = runner.run(&client.display_message(&message)) {
        warn!("could not display message in tmux: {}", e);
    }
}

/// Merge live sessions over the stored ones and write the result back
fn autosave(live: &dyn LiveState, filter: &SessionFilter, store: &SessionStore) -> Result<()> {
    let running = live
        .list_sessions(filter)
        .context("Failed to list tmux sessions")?;
    let stored = store.load().context("Failed to load sessions from disk")?;
    store
        .save(&session::combine(running, stored))
        .context("Failed to save sessions to disk")?;
    Ok(())
}
