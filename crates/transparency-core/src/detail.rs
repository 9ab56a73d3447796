//! Auxiliary browsing contexts for resource detail pages.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use transparency_config::TimeoutConfig;

use crate::driver::{BrowserDriver, ContextHandle};
use crate::error::SearchError;
use crate::pager::TablePager;
use crate::table::RawRow;
use crate::wait::settle;

/// Source of detail rows for a resource link.
#[async_trait]
pub trait DetailSource: Send + Sync {
    /// Rows behind `url`. An empty vector means nothing could be collected;
    /// only hard aborts are errors.
    async fn collect(&self, url: &str) -> Result<Vec<RawRow>, SearchError>;
}

/// Opens each detail link in its own context and always returns to the
/// context that was active before.
pub struct DetailSessionManager<'a> {
    driver: &'a dyn BrowserDriver,
    timeouts: &'a TimeoutConfig,
    max_pages: u32,
}

impl<'a> DetailSessionManager<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, timeouts: &'a TimeoutConfig, max_pages: u32) -> Self {
        Self {
            driver,
            timeouts,
            max_pages,
        }
    }

    async fn release(&self, origin: Option<&ContextHandle>) {
        if let Err(e) = self.driver.close_current_context().await {
            warn!("Failed to close detail context: {}", e);
        }

        let target = match origin {
            Some(handle) => Some(handle.clone()),
            None => match self.driver.list_context_handles().await {
                Ok(handles) => handles.into_iter().next(),
                Err(e) => {
                    warn!("Failed to list contexts: {}", e);
                    None
                }
            },
        };

        if let Some(handle) = target {
            match self.driver.switch_to_context(&handle).await {
                Ok(()) => debug!("Returned to context {}", handle),
                Err(e) => warn!("Failed to switch back to context {}: {}", handle, e),
            }
        }
    }
}

#[async_trait]
impl DetailSource for DetailSessionManager<'_> {
    async fn collect(&self, url: &str) -> Result<Vec<RawRow>, SearchError> {
        let origin = match self.driver.current_context().await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Could not read the active context: {}", e);
                None
            }
        };

        let context = match self.driver.open_new_context(url).await {
            Ok(context) => context,
            Err(e) => {
                warn!("Failed to open detail page {}: {}", url, e);
                return Ok(Vec::new());
            }
        };
        debug!("Opened detail context {} for {}", context, url);

        settle(self.timeouts.settle()).await;
        let scraped = TablePager::new(self.driver, self.timeouts, self.max_pages)
            .scrape_paginated()
            .await;

        self.release(origin.as_ref()).await;

        match scraped {
            Ok(rows) => {
                if rows.is_empty() {
                    info!("No details for {}", url);
                }
                Ok(rows)
            }
            Err(e @ SearchError::ChallengeDetected(_)) => Err(e),
            Err(e) => {
                warn!("Failed to scrape details from {}: {}", url, e);
                Ok(Vec::new())
            }
        }
    }
}
