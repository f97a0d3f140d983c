//! Lookups over an in-memory session list. None of these mutate their input.

use super::Session;
use crate::error::{Error, Result};

pub fn find_by_name<'a>(name: &str, sessions: &'a [Session]) -> Result<&'a Session> {
    sessions
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::NotFound(name.to_string()))
}

pub fn find_by_path<'a>(path: &str, sessions: &'a [Session]) -> Result<&'a Session> {
    sessions
        .iter()
        .find(|s| s.current_path == path)
        .ok_or_else(|| Error::NotFound(path.to_string()))
}

pub fn exists(name: &str, sessions: &[Session]) -> bool {
    sessions.iter().any(|s| s.name == name)
}

/// Return a copy of `sessions` without the entry called `name`.
pub fn delete(name: &str, sessions: &[Session]) -> Result<Vec<Session>> {
    let position = sessions
        .iter()
        .position(|s| s.name == name)
        .ok_or_else(|| Error::NotFound(name.to_string()))?;

    let mut remaining = sessions.to_vec();
    remaining.remove(position);
    Ok(remaining)
}
