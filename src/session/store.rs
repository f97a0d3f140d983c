use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Session;
use crate::error::{Error, Result};

const STORE_DIR: &str = "tmux-keeper";
const STORE_FILE: &str = "sessions.yaml";

/// The YAML document holding every persisted session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `tmux-keeper/sessions.yaml` under `dirs::config_dir()`
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or(Error::ConfigDirUnavailable)?;
        Ok(Self::new(config_dir.join(STORE_DIR).join(STORE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all persisted sessions. A missing file means nothing saved yet.
    pub fn load(&self) -> Result<Vec<Session>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session store yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(Error::Store {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let sessions: Vec<Session> =
            serde_yaml::from_str(&content).map_err(|source| Error::Decode {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = sessions.len(), "loaded sessions");
        Ok(sessions)
    }

    /// Overwrite the store with `sessions`.
    ///
    /// An empty list is ignored so a failed upstream listing cannot wipe history.
    pub fn save(&self, sessions: &[Session]) -> Result<()> {
        if sessions.is_empty() {
            debug!("refusing to save an empty session list");
            return Ok(());
        }
        let document = serde_yaml::to_string(sessions)?;
        self.write(&document)?;
        info!(count = sessions.len(), path = %self.path.display(), "saved sessions");
        Ok(())
    }

    /// Explicitly empty the store (used when the user deletes the last session)
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.write("[]\n")?;
        info!(path = %self.path.display(), "cleared session store");
        Ok(())
    }

    fn write(&self, document: &str) -> Result<()> {
        let store_error = |source| Error::Store {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(store_error)?;
        }
        fs::write(&self.path, document).map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Pane, Window};

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("nested").join(STORE_FILE))
    }

    fn sample() -> Vec<Session> {
        let mut api = Session::new("api", "/srv/api");
        api.windows.push(Window {
            index: "1".into(),
            panes: vec![
                Pane {
                    command: "zsh".into(),
                    current_path: "/srv/api".into(),
                    index: "1".into(),
                },
                Pane {
                    command: "nvim".into(),
                    current_path: "/srv/api/src".into(),
                    index: "2".into(),
                },
            ],
        });
        vec![api, Session::new("fresh", "/srv/fresh")]
    }

    #[test]
    fn test_load_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_save_empty_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        store.save(&[]).unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_save_empty_does_not_create_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&[]).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_overwrites_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();

        let only = vec![Session::new("only", "/only")];
        store.save(&only).unwrap();
        assert_eq!(store.load().unwrap(), only);
    }

    #[test]
    fn test_clear_empties_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join(STORE_FILE));
        fs::write(store.path(), "name: [unterminated").unwrap();
        assert!(matches!(store.load(), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_store_keys_are_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();

        let doc = fs::read_to_string(store.path()).unwrap();
        assert!(doc.contains("current-path: /srv/api"));
        assert!(doc.contains("workdir: /srv/api/src"));
    }
}
