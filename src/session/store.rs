//! Write-through session persistence: one in-memory session behind a mutex,
//! mirrored to `<data_dir>/session.json` after every mutation and restored
//! on open. A missing or unreadable file yields the default session.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::session::Session;

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug)]
pub enum StoreError {
    Lock,
    Serialize(serde_json::Error),
    Write(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock => write!(f, "session lock poisoned"),
            Self::Serialize(err) => write!(f, "failed to serialize session: {err}"),
            Self::Write(err) => write!(f, "failed to persist session: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub struct SessionStore {
    data_dir: PathBuf,
    session: Mutex<Session>,
}

impl SessionStore {
    /// Open the store under `data_dir`, restoring the previous session if a
    /// valid session file exists.
    pub fn open(data_dir: &Path) -> Self {
        let session = load_session(&data_dir.join(SESSION_FILE_NAME));
        Self {
            data_dir: data_dir.to_path_buf(),
            session: Mutex::new(session),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE_NAME)
    }

    /// Snapshot of the current session.
    pub fn snapshot(&self) -> Result<Session, StoreError> {
        let guard = self.session.lock().map_err(|_| StoreError::Lock)?;
        Ok(guard.clone())
    }

    /// Run a mutation under the lock, then persist the result. Mutations are
    /// serialized here, so concurrent roster uploads resolve to "last
    /// completed wins".
    pub fn update<T>(&self, f: impl FnOnce(&mut Session) -> T) -> Result<T, StoreError> {
        let mut guard = self.session.lock().map_err(|_| StoreError::Lock)?;
        let out = f(&mut guard);
        persist_session(&self.session_path(), &guard)?;
        Ok(out)
    }
}

fn load_session(path: &Path) -> Session {
    if !path.exists() {
        return Session::default();
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Session::default(),
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

fn persist_session(path: &Path, session: &Session) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::Write)?;
    }
    let serialized = serde_json::to_string_pretty(session).map_err(StoreError::Serialize)?;
    fs::write(path, serialized).map_err(StoreError::Write)?;
    Ok(())
}
