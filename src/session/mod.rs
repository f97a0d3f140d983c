mod directory;
mod reconcile;
mod store;

pub use directory::{delete, exists, find_by_name, find_by_path};
pub use reconcile::combine;
pub use store::SessionStore;

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single terminal surface inside a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pane {
    /// Foreground program reported by tmux (empty when nothing is recognized)
    #[serde(default)]
    pub command: String,
    /// Working directory of the pane
    #[serde(rename = "workdir")]
    pub current_path: String,
    /// tmux pane index at capture time (display only)
    #[serde(default)]
    pub index: String,
}

/// An ordered group of panes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub panes: Vec<Pane>,
    /// tmux window index at capture time (display only)
    #[serde(default)]
    pub index: String,
}

/// A named group of windows rooted at a working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Session {
    pub name: String,
    #[serde(default)]
    pub windows: Vec<Window>,
    pub current_path: String,
}

impl Session {
    /// A session with no windows yet
    pub fn new(name: impl Into<String>, current_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            windows: Vec::new(),
            current_path: current_path.into(),
        }
    }
}

static RE_UNSAFE_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_-]").unwrap());

/// Replace every character tmux or the filesystem might choke on with `_`
pub fn sanitize_name(raw: &str) -> String {
    RE_UNSAFE_NAME_CHARS.replace_all(raw, "_").into_owned()
}

/// Derive a session name for `start_path` that `is_taken` does not reject.
///
/// Candidates grow leftwards one path component at a time:
/// `/a/b/c` tries `c`, then `b-c`, then `a-b-c`.
pub fn unique_session_name<F>(start_path: &str, mut is_taken: F) -> anyhow::Result<String>
where
    F: FnMut(&str) -> anyhow::Result<bool>,
{
    let mut parts: Vec<String> = Vec::new();
    let mut path = Path::new(start_path);

    loop {
        let Some(component) = path.file_name() else {
            anyhow::bail!("could not find a unique session name for path: {}", start_path);
        };
        parts.insert(0, component.to_string_lossy().into_owned());

        let candidate = sanitize_name(&parts.join("-"));
        if !is_taken(&candidate)? {
            return Ok(candidate);
        }

        match path.parent() {
            Some(parent) if parent != path => path = parent,
            _ => anyhow::bail!("could not find a unique session name for path: {}", start_path),
        }
    }
}
