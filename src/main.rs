use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tmux_keeper::config::Config;
use tmux_keeper::handlers::Switcher;
use tmux_keeper::runner::OsRunner;
use tmux_keeper::session::SessionStore;
use tmux_keeper::tmux::{SessionFilter, TmuxClient};
use tmux_keeper::{boot, daemon};

#[derive(Parser)]
#[command(name = "tmux-keeper")]
#[command(about = "Save, switch and restore tmux sessions")]
struct Cli {
    /// Run the autosave daemon
    #[arg(short, long)]
    daemon: bool,

    /// Attach to tmux, starting it with the switcher if needed
    #[arg(short, long)]
    boot: bool,

    /// Open the session switcher
    #[arg(short, long)]
    switcher: bool,

    /// Config file (defaults to tmux-keeper/config.yaml under the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.daemon {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    // RUST_LOG wins over the per-mode default
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli).await {
        report_error(&e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let store = SessionStore::default_location()?;

    if cli.daemon {
        return daemon::run(&config, store).await;
    }

    let client = TmuxClient::new();
    let mut runner = OsRunner;
    if cli.boot {
        return boot::run(&config, &client, &mut runner);
    }
    if cli.switcher {
        let filter = SessionFilter::for_current_user()?;
        return Switcher::new(&config, &store, &client, filter, &mut runner).run();
    }
    Ok(())
}

/// The switcher lives in a tmux popup that vanishes on exit; hold the error on screen.
fn report_error(e: &anyhow::Error) {
    eprintln!("\x1b[31mError: {:#}\x1b[0m", e);
    eprintln!("Press Enter to continue...");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
