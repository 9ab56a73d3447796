//! Table scraping over the current browsing context.

use tracing::{debug, info, warn};

use transparency_config::TimeoutConfig;

use crate::driver::BrowserDriver;
use crate::error::{DriverError, SearchError};
use crate::selectors::{CHALLENGE_PAGE_TITLE, DETAIL_NEXT_PAGE_BTN, DETAIL_TABLE};
use crate::table::{parse_data_table, parse_titled_tables, RawRow, RawTable};
use crate::wait::settle;

pub struct TablePager<'a> {
    driver: &'a dyn BrowserDriver,
    timeouts: &'a TimeoutConfig,
    max_pages: u32,
}

impl<'a> TablePager<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, timeouts: &'a TimeoutConfig, max_pages: u32) -> Self {
        Self {
            driver,
            timeouts,
            max_pages,
        }
    }

    /// Fail with [`SearchError::ChallengeDetected`] when the portal shows its
    /// anti-automation page. An unreadable title is not a challenge.
    pub async fn ensure_not_challenged(&self) -> Result<(), SearchError> {
        match self.driver.current_page_title().await {
            Ok(title) if title == CHALLENGE_PAGE_TITLE => {
                warn!("Detected '{}' page, stopping", CHALLENGE_PAGE_TITLE);
                Err(SearchError::ChallengeDetected(title))
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("Could not read page title: {}", e);
                Ok(())
            }
        }
    }

    /// Every titled resource table on the current page.
    pub async fn scrape_titled_tables(&self) -> Result<Vec<RawTable>, SearchError> {
        let markup = self.driver.read_page_markup().await?;
        let tables = parse_titled_tables(&markup);
        info!("Scraped {} table(s) from page", tables.len());
        Ok(tables)
    }

    /// Rows of the paginated detail table, following the next-page control
    /// until it disappears.
    pub async fn scrape_paginated(&self) -> Result<Vec<RawRow>, SearchError> {
        let mut rows = Vec::new();
        let mut page = 0;

        loop {
            self.ensure_not_challenged().await?;

            if page >= self.max_pages {
                warn!("Stopped after {} detail page(s)", self.max_pages);
                break;
            }
            page += 1;

            match self
                .driver
                .wait_until_present(DETAIL_TABLE, self.timeouts.element())
                .await
            {
                Ok(_) => {}
                Err(e) if e.is_transient() => debug!("Detail table not rendered: {}", e),
                Err(e) => return Err(e.into()),
            }
            settle(self.timeouts.settle()).await;

            let markup = self.driver.read_page_markup().await?;
            let Some(page_rows) = parse_data_table(&markup) else {
                info!("No table found on detail page {}", page);
                break;
            };
            if page_rows.is_empty() {
                debug!("Detail page {} has no rows", page);
                break;
            }
            rows.extend(page_rows);

            if !self.next_page().await? {
                break;
            }
        }

        info!("Scraped {} row(s) from {} detail page(s)", rows.len(), page);
        Ok(rows)
    }

    async fn next_page(&self) -> Result<bool, DriverError> {
        match self
            .driver
            .wait_until_clickable(DETAIL_NEXT_PAGE_BTN, self.timeouts.element())
            .await
        {
            Ok(button) => match self.driver.click(&button).await {
                Ok(()) => {
                    debug!("Moved to next detail page");
                    Ok(true)
                }
                Err(e) if e.is_transient() => Ok(false),
                Err(e) => Err(e),
            },
            Err(e) if e.is_transient() => {
                debug!("No more detail pages");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "pager_tests.rs"]
mod tests;
