//! Browser manager type definitions and configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use transparency_config::Config;
use transparency_core::DriverError;

use crate::cdp::CdpError;

/// Browser manager errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("No such browsing context: {0}")]
    ContextNotFound(String),

    #[error("No current browsing context")]
    NoCurrentContext,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Script failed: {0}")]
    ScriptFailed(String),

    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome or set browser.chrome_path.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Unreachable { .. } => BrowserError::ConnectionFailed(e.to_string()),
            CdpError::Transport(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::NavigationFailed(msg) => BrowserError::NavigationFailed(msg),
            CdpError::JavaScript(msg) => BrowserError::ScriptFailed(msg),
            CdpError::SessionClosed => BrowserError::NotConnected,
            _ => BrowserError::ActionFailed(e.to_string()),
        }
    }
}

impl From<BrowserError> for DriverError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::ContextNotFound(handle) => DriverError::NoSuchContext(handle),
            BrowserError::NoCurrentContext => DriverError::NoSuchContext("current".to_string()),
            BrowserError::ScriptFailed(msg) => DriverError::Script(msg),
            other => DriverError::Browser(other.to_string()),
        }
    }
}

/// Browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Profile directory for persistent login state.
    pub profile_dir: Option<PathBuf>,
    /// Explicit Chrome executable; discovered when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    /// Interval between readiness probes while waiting for elements.
    pub poll_interval: Duration,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BrowserManagerConfig {
    pub fn from_config(config: &Config) -> Self {
        let browser = &config.browser;
        Self {
            debug_port: browser.debug_port,
            viewport_width: browser.viewport_width,
            viewport_height: browser.viewport_height,
            profile_dir: browser.profile_dir.clone(),
            chrome_path: browser.chrome_path.clone(),
            headless: browser.headless,
            poll_interval: config.timeouts.poll_interval(),
        }
    }

    /// Profile directory, defaulting to `~/.transparency/browser-profile`.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| transparency_config::base_dir().join("browser-profile"))
    }

    /// CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}
