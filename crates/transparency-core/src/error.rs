//! Error types for the search pipeline.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by a [`BrowserDriver`](crate::driver::BrowserDriver).
#[derive(Debug, Error)]
pub enum DriverError {
    /// Element did not become present/clickable in time.
    #[error("Timed out after {timeout:?} waiting for {locator}")]
    Timeout { locator: String, timeout: Duration },

    /// Element is not on the current page.
    #[error("Element not found: {0}")]
    NotFound(String),

    /// Element handle no longer resolves (page re-rendered).
    #[error("Stale element: {0}")]
    Stale(String),

    /// Browsing context does not exist.
    #[error("No such browsing context: {0}")]
    NoSuchContext(String),

    /// JavaScript evaluation failed.
    #[error("Script error: {0}")]
    Script(String),

    /// Any other browser-side failure.
    #[error("Browser error: {0}")]
    Browser(String),
}

impl DriverError {
    /// Whether this is a readiness failure that callers may treat as
    /// "nothing there" instead of a crash.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::Timeout { .. } | DriverError::NotFound(_) | DriverError::Stale(_)
        )
    }
}

/// Search pipeline errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Empty or malformed caller input.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Filter names outside the supported set.
    #[error("Invalid filters: {invalid}. Available: {available}")]
    UnknownFilter { invalid: String, available: String },

    /// Report persistence requires a 6-digit identifier fragment.
    #[error("Identifier fragment must be exactly 6 digits, got '{0}'")]
    InvalidIdentifierFragment(String),

    #[error("Invalid result count: {0}")]
    InvalidResultCount(i64),

    /// The result page listed a different number of names and identifiers.
    #[error("Names and identifiers mismatch: {names} name(s), {identifiers} identifier(s)")]
    ResultListMismatch { names: usize, identifiers: usize },

    /// The query matched more people than can be disambiguated safely.
    #[error("Found {count} results for '{query}', exceeds maximum of {max}")]
    TooManyResults { count: i64, query: String, max: i64 },

    /// The portal served an anti-automation page.
    #[error("Automation stopped: detected '{0}' page")]
    ChallengeDetected(String),

    /// The portal landing or search page could not be reached.
    #[error("Portal unavailable: {0}")]
    PortalUnavailable(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    /// Whether a fresh attempt could succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::Driver(_) | SearchError::PortalUnavailable(_))
    }

    /// Whether this error is a readiness timeout that degrades to "no results".
    pub fn is_transient(&self) -> bool {
        matches!(self, SearchError::Driver(e) if e.is_transient())
    }
}
