mod client;
mod live;
mod parser;
mod restore;

pub use client::TmuxClient;
pub use live::{LiveState, ReportSnapshot};
pub use parser::{find_in_session_report, parse_pane_report, Lookup, SessionFilter};
pub use restore::{plan_restore, restore};

/// Session created at tmux startup to host the switcher; never listed or saved
pub const BOOT_SESSION_NAME: &str = "tmux-keeper-startup";
