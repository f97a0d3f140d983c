use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the session core (model, store, tmux, restoration)
#[derive(Debug, Error)]
pub enum Error {
    /// A session name is absent from the list it was looked up in
    #[error("session not found: {0}")]
    NotFound(String),

    /// tmux (or another external program) could not be started or exited abnormally
    #[error("command `{command}` failed: {message}")]
    Command { command: String, message: String },

    /// I/O failure on the persisted session store
    #[error("session store {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to encode sessions: {0}")]
    Encode(#[from] serde_yaml::Error),

    #[error("could not determine the user's home directory")]
    HomeDirUnavailable,

    #[error("could not determine the user's config directory")]
    ConfigDirUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;
