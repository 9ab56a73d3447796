//! Browser driver capability consumed by the search pipeline.
//!
//! The pipeline never talks to a browser directly. Everything it needs is
//! expressed through [`BrowserDriver`], so the CDP implementation and the test
//! doubles are interchangeable.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DriverError;

/// How to find an element on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    XPath(&'static str),
    Css(&'static str),
}

impl Locator {
    pub fn expression(&self) -> &'static str {
        match self {
            Locator::XPath(expr) | Locator::Css(expr) => expr,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::XPath(expr) => write!(f, "xpath:{}", expr),
            Locator::Css(expr) => write!(f, "css:{}", expr),
        }
    }
}

/// Reference to the `index`-th match of `locator` on the current page.
///
/// Handles are resolved lazily by the driver, so a handle taken before a
/// re-render may come back as [`DriverError::Stale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub locator: Locator,
    pub index: usize,
}

impl ElementHandle {
    pub fn new(locator: Locator, index: usize) -> Self {
        Self { locator, index }
    }
}

/// Opaque identifier of a browsing context (tab).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub String);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page interaction capability.
///
/// Every call blocks the caller's task until the browser answers or the
/// operation times out; the pipeline never issues two calls concurrently.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn find(&self, locator: Locator) -> Result<Option<ElementHandle>, DriverError>;

    async fn find_all(&self, locator: Locator) -> Result<Vec<ElementHandle>, DriverError>;

    /// Wait until the first match is visible and enabled.
    async fn wait_until_clickable(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError>;

    /// Wait until the first match exists in the DOM.
    async fn wait_until_present(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Replace the content of an input with `text`.
    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    async fn read_text(&self, element: &ElementHandle) -> Result<String, DriverError>;

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Full serialized DOM of the current page.
    async fn read_page_markup(&self) -> Result<String, DriverError>;

    /// PNG capture of a single element.
    async fn screenshot(&self, element: &ElementHandle) -> Result<Vec<u8>, DriverError>;

    /// Open `url` in a new context and make it the current one.
    async fn open_new_context(&self, url: &str) -> Result<ContextHandle, DriverError>;

    /// Close the current context. No context is current afterwards until
    /// [`switch_to_context`](Self::switch_to_context) is called.
    async fn close_current_context(&self) -> Result<(), DriverError>;

    async fn switch_to_context(&self, handle: &ContextHandle) -> Result<(), DriverError>;

    /// Open contexts in the order they were created.
    async fn list_context_handles(&self) -> Result<Vec<ContextHandle>, DriverError>;

    async fn current_context(&self) -> Result<ContextHandle, DriverError>;

    async fn current_page_title(&self) -> Result<String, DriverError>;

    async fn execute_script(&self, script: &str) -> Result<Value, DriverError>;
}

/// Restores persisted browser state (cookies, local storage) after the
/// landing page loads.
#[async_trait]
pub trait SessionRestorer: Send + Sync {
    async fn restore(&self) -> Result<(), DriverError>;
}
