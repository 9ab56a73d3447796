//! Portal bootstrap: landing page, consent banner, tutorial and the menu
//! path to the person search form.

use tracing::{debug, info, warn};

use transparency_config::TimeoutConfig;

use crate::driver::{BrowserDriver, Locator, SessionRestorer};
use crate::error::{DriverError, SearchError};
use crate::retry::RetryPolicy;
use crate::selectors::{
    ACCEPT_ALL_COOKIES_BTN, NATURAL_PERSON_SEARCH_BTN, PEOPLE_SEARCH_SERVICE_BTN,
    TUTORIAL_CLOSE_BTN,
};

pub struct Portal<'a> {
    driver: &'a dyn BrowserDriver,
    base_url: &'a str,
    timeouts: &'a TimeoutConfig,
    restorer: Option<&'a dyn SessionRestorer>,
}

impl<'a> Portal<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, base_url: &'a str, timeouts: &'a TimeoutConfig) -> Self {
        Self {
            driver,
            base_url,
            timeouts,
            restorer: None,
        }
    }

    /// Restore cookies and local storage once the landing page is loaded.
    pub fn with_session_restorer(mut self, restorer: &'a dyn SessionRestorer) -> Self {
        self.restorer = Some(restorer);
        self
    }

    /// Bring the browser to the person search form, retrying the whole
    /// sequence under `retry`.
    pub async fn start(&self, retry: &RetryPolicy) -> Result<(), SearchError> {
        retry
            .run("Portal start", || async move {
                self.open().await?;
                self.go_to_person_search().await
            })
            .await
            .map_err(|e| match e {
                SearchError::Driver(inner) => SearchError::PortalUnavailable(format!(
                    "Failed to load Transparency Portal: {}",
                    inner
                )),
                other => other,
            })
    }

    /// Load the landing page and clear the optional overlays.
    pub async fn open(&self) -> Result<(), SearchError> {
        self.driver.navigate(self.base_url).await?;
        info!("Opened {}", self.base_url);

        if let Some(restorer) = self.restorer {
            if let Err(e) = restorer.restore().await {
                warn!("Failed to restore browser session: {}", e);
            }
        }

        self.click_if_shown(ACCEPT_ALL_COOKIES_BTN, "Cookies accepted", "No cookie prompt found")
            .await?;
        self.click_if_shown(TUTORIAL_CLOSE_BTN, "Tutorial closed", "No tutorial found")
            .await?;
        Ok(())
    }

    /// Follow the services menu to the natural-person search page.
    pub async fn go_to_person_search(&self) -> Result<(), SearchError> {
        for locator in [PEOPLE_SEARCH_SERVICE_BTN, NATURAL_PERSON_SEARCH_BTN] {
            match self.click(locator).await {
                Ok(()) => {}
                Err(e) if e.is_transient() => {
                    return Err(SearchError::PortalUnavailable(format!(
                        "Navigation to search page failed: {}",
                        e
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!("On search page");
        Ok(())
    }

    async fn click(&self, locator: Locator) -> Result<(), DriverError> {
        let element = self
            .driver
            .wait_until_clickable(locator, self.timeouts.element())
            .await?;
        self.driver.click(&element).await
    }

    async fn click_if_shown(
        &self,
        locator: Locator,
        done: &str,
        absent: &str,
    ) -> Result<(), DriverError> {
        match self.click(locator).await {
            Ok(()) => {
                info!("{}", done);
                Ok(())
            }
            Err(e) if e.is_transient() => {
                debug!("{}", absent);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_driver::{FakeDriver, FakeElement, FakePage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    const BASE: &str = "https://portal";

    fn timeouts() -> TimeoutConfig {
        TimeoutConfig {
            element_secs: 0,
            results_secs: 0,
            poll_interval_ms: 1,
            settle_ms: 0,
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(1),
        }
    }

    fn landing() -> FakePage {
        FakePage::new("Portal da Transparência")
            .with(ACCEPT_ALL_COOKIES_BTN, FakeElement::new("Aceitar"))
            .with(PEOPLE_SEARCH_SERVICE_BTN, FakeElement::button("services"))
    }

    fn services() -> FakePage {
        FakePage::new("Serviços").with(NATURAL_PERSON_SEARCH_BTN, FakeElement::button("search"))
    }

    struct CountingRestorer(AtomicU32);

    #[async_trait]
    impl SessionRestorer for CountingRestorer {
        async fn restore(&self) -> Result<(), DriverError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(DriverError::Browser("no cookie file".to_string()))
        }
    }

    #[tokio::test]
    async fn test_start_reaches_search_page() {
        let driver = FakeDriver::new("about:blank")
            .with_page(BASE, landing())
            .with_page("services", services())
            .with_page("search", FakePage::new("Busca"));
        let timeouts = timeouts();
        let restorer = CountingRestorer(AtomicU32::new(0));

        Portal::new(&driver, BASE, &timeouts)
            .with_session_restorer(&restorer)
            .start(&fast_retry())
            .await
            .unwrap();

        assert_eq!(driver.current_page_key().as_deref(), Some("search"));
        assert_eq!(restorer.0.load(Ordering::SeqCst), 1);
        assert_eq!(
            driver.clicks(),
            vec![ACCEPT_ALL_COOKIES_BTN, PEOPLE_SEARCH_SERVICE_BTN, NATURAL_PERSON_SEARCH_BTN]
        );
    }

    #[tokio::test]
    async fn test_missing_menu_is_unavailable_after_retries() {
        let driver = FakeDriver::new("about:blank").with_page(BASE, FakePage::new("Portal"));
        let timeouts = timeouts();
        let restorer = CountingRestorer(AtomicU32::new(0));

        let err = Portal::new(&driver, BASE, &timeouts)
            .with_session_restorer(&restorer)
            .start(&fast_retry())
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::PortalUnavailable(_)));
        assert_eq!(restorer.0.load(Ordering::SeqCst), 3);
    }
}
