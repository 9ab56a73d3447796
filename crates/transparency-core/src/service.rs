//! Person search entry point.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, warn};

use transparency_config::{Config, TimeoutConfig};

use crate::detail::DetailSessionManager;
use crate::driver::{BrowserDriver, Locator, SessionRestorer};
use crate::error::SearchError;
use crate::gate::MAX_THRESHOLD;
use crate::identity::{identifier_slice, normalize_identifier, Candidate};
use crate::normalizer::RecordNormalizer;
use crate::orchestrator::{Disambiguation, SearchOrchestrator};
use crate::pager::TablePager;
use crate::portal::Portal;
use crate::report::{Report, ReportBuilder};
use crate::request::SearchRequest;
use crate::retry::RetryPolicy;
use crate::selectors::{
    FINANCIAL_RESOURCES_SECTION, MAIN_CONTENT, PERSON_IDENTIFIER, PERSON_LOCATION, RESOURCE_TABLES,
};
use crate::wait::settle;

/// Placeholder for person page fields that could not be read.
pub const UNKNOWN: &str = "Unknown";

/// Everything a search needs besides the driver and the request.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub base_url: String,
    pub timeouts: TimeoutConfig,
    pub max_pages: u32,
    pub retry: RetryPolicy,
    /// Where reports are written; `None` disables persistence.
    pub output_dir: Option<PathBuf>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.portal.base_url.clone(),
            timeouts: config.timeouts.clone(),
            max_pages: config.pager.max_pages,
            retry: RetryPolicy::from(&config.retry),
            output_dir: config.output.save.then(|| config.output.dir.clone()),
        }
    }
}

/// Runs searches against the portal through one browser.
pub struct PersonSearchService<'a> {
    driver: &'a dyn BrowserDriver,
    settings: &'a SearchSettings,
    restorer: Option<&'a dyn SessionRestorer>,
}

impl<'a> PersonSearchService<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, settings: &'a SearchSettings) -> Self {
        Self {
            driver,
            settings,
            restorer: None,
        }
    }

    pub fn with_session_restorer(mut self, restorer: &'a dyn SessionRestorer) -> Self {
        self.restorer = Some(restorer);
        self
    }

    /// Find the requested person and extract their received resources.
    ///
    /// Not finding anyone yields an empty report. Too many results, invalid
    /// input and anti-automation pages are errors.
    pub async fn search(&self, request: &SearchRequest) -> Result<Report, SearchError> {
        let query = request.search_value()?;

        let mut portal = Portal::new(self.driver, &self.settings.base_url, &self.settings.timeouts);
        if let Some(restorer) = self.restorer {
            portal = portal.with_session_restorer(restorer);
        }
        portal.start(&self.settings.retry).await?;

        let outcome = SearchOrchestrator::new(self.driver, request, &self.settings.timeouts)
            .run()
            .await?;

        match outcome {
            Disambiguation::Located(candidate) => self.extract(request, &candidate).await,
            Disambiguation::NoResults | Disambiguation::NoMatch => {
                info!("No matching person for '{}'", query);
                Ok(ReportBuilder::empty())
            }
            Disambiguation::TooMany { count } => Err(SearchError::TooManyResults {
                count,
                query,
                max: MAX_THRESHOLD,
            }),
        }
    }

    async fn extract(
        &self,
        request: &SearchRequest,
        candidate: &Candidate,
    ) -> Result<Report, SearchError> {
        let timeouts = &self.settings.timeouts;
        info!("Extracting resources for '{}'", candidate.display_name);

        match self
            .driver
            .wait_until_clickable(FINANCIAL_RESOURCES_SECTION, timeouts.element())
            .await
        {
            Ok(section) => self.driver.click(&section).await?,
            Err(e) if e.is_transient() => warn!("Financial resources section not found: {}", e),
            Err(e) => return Err(e.into()),
        }
        settle(timeouts.settle()).await;

        let screenshot = self.screenshot().await;

        let pager = TablePager::new(self.driver, timeouts, self.settings.max_pages);
        pager.ensure_not_challenged().await?;
        match self
            .driver
            .wait_until_present(RESOURCE_TABLES, timeouts.element())
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_transient() => debug!("No resource tables rendered: {}", e),
            Err(e) => return Err(e.into()),
        }
        let tables = pager.scrape_titled_tables().await?;

        let details = DetailSessionManager::new(self.driver, timeouts, self.settings.max_pages);
        let records = RecordNormalizer::new(&self.settings.base_url)?
            .normalize(tables, &details)
            .await?;

        let page_identifier = self
            .read_field(PERSON_IDENTIFIER)
            .await
            .map(|text| normalize_identifier(&text))
            .filter(|digits| !digits.is_empty());
        let location = self.read_field(PERSON_LOCATION).await;

        let report = ReportBuilder::build(
            records,
            page_identifier.as_deref().unwrap_or(UNKNOWN),
            location.as_deref().unwrap_or(UNKNOWN),
            screenshot,
        )?;

        if let Some(dir) = &self.settings.output_dir {
            let source = page_identifier
                .unwrap_or_else(|| normalize_identifier(request.target_identifier()));
            report.persist(dir, identifier_slice(&source))?;
        }

        Ok(report)
    }

    /// Base64 PNG of the main content, or empty when it cannot be taken.
    async fn screenshot(&self) -> String {
        let element = match self.driver.find(MAIN_CONTENT).await {
            Ok(Some(element)) => element,
            Ok(None) => {
                warn!("Element not found: {}", MAIN_CONTENT);
                return String::new();
            }
            Err(e) => {
                warn!("Screenshot error: {}", e);
                return String::new();
            }
        };

        match self.driver.screenshot(&element).await {
            Ok(png) => {
                info!("Screenshot captured");
                STANDARD.encode(png)
            }
            Err(e) => {
                warn!("Screenshot error: {}", e);
                String::new()
            }
        }
    }

    /// Trimmed text of a person page field, `None` when absent or blank.
    async fn read_field(&self, locator: Locator) -> Option<String> {
        let element = match self
            .driver
            .wait_until_present(locator, self.settings.timeouts.element())
            .await
        {
            Ok(element) => element,
            Err(e) => {
                warn!("Field {} not found: {}", locator, e);
                return None;
            }
        };

        match self.driver.read_text(&element).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read {}: {}", locator, e);
                None
            }
        }
    }
}

/// Search with a fresh [`PersonSearchService`] and no session restore.
pub async fn search(
    driver: &dyn BrowserDriver,
    request: &SearchRequest,
    settings: &SearchSettings,
) -> Result<Report, SearchError> {
    PersonSearchService::new(driver, settings).search(request).await
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
