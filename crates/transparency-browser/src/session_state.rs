//! Cookie and local storage persistence between runs.
//!
//! State is captured once from an interactive browser (`capture-session`)
//! and restored after the portal landing page loads, so the portal sees a
//! returning visitor. Missing files mean "nothing to restore"; unreadable
//! ones are logged and skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use transparency_config::PathsConfig;
use transparency_core::{DriverError, SessionRestorer};

use crate::cdp::{Cookie, PageSession};
use crate::manager::{BrowserError, BrowserManager};
use crate::script;

#[derive(Debug, Error)]
pub enum SessionStateError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Where cookies and local storage are kept.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub cookies: PathBuf,
    pub local_storage: PathBuf,
}

impl From<&PathsConfig> for SessionPaths {
    fn from(paths: &PathsConfig) -> Self {
        Self {
            cookies: paths.cookies.clone(),
            local_storage: paths.local_storage.clone(),
        }
    }
}

pub fn read_cookies(path: &Path) -> Result<Option<Vec<Cookie>>, SessionStateError> {
    read_json(path)
}

pub fn read_local_storage(path: &Path) -> Result<Option<BTreeMap<String, String>>, SessionStateError> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SessionStateError> {
    if !path.exists() {
        debug!("No session file at {}", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| SessionStateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| SessionStateError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), SessionStateError> {
    let io_err = |source| SessionStateError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string(value).map_err(|source| SessionStateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)
}

/// Apply the cookie file at `path` to the browser. Returns how many
/// cookies were set; a missing or unreadable file sets none.
pub async fn load_cookies(session: &PageSession, path: &Path) -> Result<usize, BrowserError> {
    match read_cookies(path) {
        Ok(Some(cookies)) => {
            session.set_cookies(&cookies).await?;
            info!("Loaded {} cookies", cookies.len());
            Ok(cookies.len())
        }
        Ok(None) => Ok(0),
        Err(e) => {
            warn!("Error loading cookies: {}", e);
            Ok(0)
        }
    }
}

/// Copy the local storage file at `path` into the page's origin.
pub async fn load_local_storage(session: &PageSession, path: &Path) -> Result<usize, BrowserError> {
    match read_local_storage(path) {
        Ok(Some(entries)) if !entries.is_empty() => {
            session.evaluate(&script::set_local_storage(&entries)).await?;
            info!("Loaded {} local storage entries", entries.len());
            Ok(entries.len())
        }
        Ok(_) => Ok(0),
        Err(e) => {
            warn!("Error loading local storage: {}", e);
            Ok(0)
        }
    }
}

/// Save the current tab's local storage and the browser's cookies.
pub async fn capture_session_state(
    manager: &BrowserManager,
    paths: &SessionPaths,
) -> Result<(), SessionStateError> {
    let session = manager.current_session().await?;

    let dump = session
        .evaluate(script::DUMP_LOCAL_STORAGE)
        .await
        .map_err(BrowserError::from)?;
    let entries: BTreeMap<String, String> = serde_json::from_str(dump.as_str().unwrap_or("{}"))
        .map_err(|source| SessionStateError::Parse {
            path: paths.local_storage.clone(),
            source,
        })?;
    write_json(&paths.local_storage, &entries)?;
    info!("Local storage saved in {}", paths.local_storage.display());

    let cookies = session.get_all_cookies().await.map_err(BrowserError::from)?;
    write_json(&paths.cookies, &cookies)?;
    info!("Cookies saved in {}", paths.cookies.display());

    Ok(())
}

/// [`SessionRestorer`] that loads persisted state into the manager's
/// current tab.
pub struct PersistedSession<'a> {
    manager: &'a BrowserManager,
    paths: SessionPaths,
}

impl<'a> PersistedSession<'a> {
    pub fn new(manager: &'a BrowserManager, paths: SessionPaths) -> Self {
        Self { manager, paths }
    }
}

#[async_trait]
impl SessionRestorer for PersistedSession<'_> {
    async fn restore(&self) -> Result<(), DriverError> {
        let session = self.manager.current_session().await?;
        load_cookies(&session, &self.paths.cookies).await?;
        load_local_storage(&session, &self.paths.local_storage).await?;
        Ok(())
    }
}
