//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub pager: PagerConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Base directory for everything the tool writes (`~/.transparency`).
pub fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".transparency")
}

/// Portal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://portaldatransparencia.gov.br".to_string()
}

/// Browser launch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    /// Profile directory for persistent login state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<PathBuf>,

    /// Explicit Chrome executable; discovered when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            profile_dir: None,
            chrome_path: None,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

/// Upper bounds for every readiness wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Wait for an element to become present or clickable.
    #[serde(default = "default_element_secs")]
    pub element_secs: u64,

    /// Wait for the search result counter to render.
    #[serde(default = "default_results_secs")]
    pub results_secs: u64,

    /// Interval between readiness probes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Extra delay after a page reports ready, for script-rendered tables.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_secs: default_element_secs(),
            results_secs: default_results_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn results(&self) -> Duration {
        Duration::from_secs(self.results_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

fn default_element_secs() -> u64 {
    10
}

fn default_results_secs() -> u64 {
    15
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_settle_ms() -> u64 {
    2000
}

/// Detail table pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

fn default_max_pages() -> u32 {
    200
}

/// Retry policy for the portal bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_secs() -> u64 {
    2
}

/// Filesystem locations for session state and crash artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_cookies")]
    pub cookies: PathBuf,

    #[serde(default = "default_local_storage")]
    pub local_storage: PathBuf,

    #[serde(default = "default_error_log")]
    pub error_log: PathBuf,

    #[serde(default = "default_error_screenshot")]
    pub error_screenshot: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            cookies: default_cookies(),
            local_storage: default_local_storage(),
            error_log: default_error_log(),
            error_screenshot: default_error_screenshot(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    base_dir().join("cache")
}

fn default_cookies() -> PathBuf {
    default_cache_dir().join("cookies.json")
}

fn default_local_storage() -> PathBuf {
    default_cache_dir().join("local_storage.json")
}

fn default_error_log() -> PathBuf {
    base_dir().join("log").join("error.txt")
}

fn default_error_screenshot() -> PathBuf {
    base_dir().join("logs").join("error.png")
}

/// Report output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives `ID_<fragment>_<timestamp>.json` reports.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_save")]
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            save: default_save(),
        }
    }
}

fn default_save() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            dir: default_log_dir(),
            max_files: default_max_files(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    base_dir().join("debug")
}

fn default_max_files() -> usize {
    30
}
