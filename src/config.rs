//! User configuration (`tmux-keeper/config.yaml` under the platform config directory).
//!
//! Built once per run: static defaults overlaid by the optional YAML file,
//! then passed by reference to whatever needs it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "tmux-keeper";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub auto_save: bool,
    pub auto_save_interval_minutes: u64,
    /// Comma-separated programs that are re-launched on restore
    pub program_whitelist: String,
    /// Sent instead of a bare `nvim` when non-empty
    pub nvim_custom_command: String,
    pub select_first: bool,
    /// Kill the bootstrap session once the switcher leaves it
    pub kill_boot_session: bool,
    pub fzf_opts: String,
    pub fzf_prompt: String,
    pub fzf_bind_new: String,
    pub fzf_bind_delete: String,
    pub fzf_bind_interactive: String,
    pub fzf_bind_save: String,
    pub zoxide_opts: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_save: true,
            auto_save_interval_minutes: 5,
            program_whitelist: "nvim,vim,htop,btop,lazygit".to_string(),
            nvim_custom_command: String::new(),
            select_first: true,
            kill_boot_session: true,
            fzf_opts: "--reverse --height=100%".to_string(),
            fzf_prompt: "Sessions> ".to_string(),
            fzf_bind_new: "ctrl-n".to_string(),
            fzf_bind_delete: "ctrl-d".to_string(),
            fzf_bind_interactive: "ctrl-f".to_string(),
            fzf_bind_save: "ctrl-s".to_string(),
            zoxide_opts: "--reverse".to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config: {}", path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// `tmux-keeper/config.yaml` under `dirs::config_dir()`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Whether `command` may be re-invoked automatically on restore
    pub fn whitelisted(&self, command: &str) -> bool {
        !command.is_empty()
            && self
                .program_whitelist
                .split(',')
                .map(str::trim)
                .any(|entry| !entry.is_empty() && entry == command)
    }
}
