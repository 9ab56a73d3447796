//! Search form state machine: enter value, apply filters, submit, pick the
//! matching result.

use std::fmt;

use tracing::{debug, info, warn};

use transparency_config::TimeoutConfig;

use crate::driver::BrowserDriver;
use crate::error::SearchError;
use crate::filters::apply_filters;
use crate::gate::{GateOutcome, ResultGate, MAX_THRESHOLD};
use crate::identity::{Candidate, IdentityMatcher};
use crate::request::SearchRequest;
use crate::selectors::{RESULT_COUNT, RESULT_IDENTIFIERS, RESULT_NAMES, SEARCH_BTN, SEARCH_INPUT};
use crate::wait::{poll_until, settle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    ValueEntered,
    FiltersApplied,
    Submitted,
    Disambiguated { matched: bool },
    Terminal,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchState::Idle => f.write_str("idle"),
            SearchState::ValueEntered => f.write_str("value entered"),
            SearchState::FiltersApplied => f.write_str("filters applied"),
            SearchState::Submitted => f.write_str("submitted"),
            SearchState::Disambiguated { matched: true } => f.write_str("disambiguated (match)"),
            SearchState::Disambiguated { matched: false } => {
                f.write_str("disambiguated (no match)")
            }
            SearchState::Terminal => f.write_str("terminal"),
        }
    }
}

/// Outcome of a search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disambiguation {
    /// The candidate was clicked; the browser now shows the person page.
    Located(Candidate),
    NoResults,
    NoMatch,
    TooMany { count: i64 },
}

/// Parse the result counter ("1.234" style thousands separators, empty
/// meaning zero).
pub fn parse_result_count(text: &str) -> Option<i64> {
    let digits: String = text.trim().chars().filter(|c| *c != '.').collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

/// Drives one search through the portal's form.
pub struct SearchOrchestrator<'a> {
    driver: &'a dyn BrowserDriver,
    request: &'a SearchRequest,
    timeouts: &'a TimeoutConfig,
    state: SearchState,
}

impl<'a> SearchOrchestrator<'a> {
    pub fn new(
        driver: &'a dyn BrowserDriver,
        request: &'a SearchRequest,
        timeouts: &'a TimeoutConfig,
    ) -> Self {
        Self {
            driver,
            request,
            timeouts,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Run the search to completion. Readiness timeouts at any step end the
    /// run with [`Disambiguation::NoResults`].
    pub async fn run(&mut self) -> Result<Disambiguation, SearchError> {
        let result = self.drive().await;
        self.transition(SearchState::Terminal);

        match result {
            Err(e) if e.is_transient() => {
                warn!("Search gave up waiting for the page: {}", e);
                Ok(Disambiguation::NoResults)
            }
            other => other,
        }
    }

    async fn drive(&mut self) -> Result<Disambiguation, SearchError> {
        let value = self.request.search_value()?;

        let input = self
            .driver
            .wait_until_clickable(SEARCH_INPUT, self.timeouts.element())
            .await?;
        self.driver.type_text(&input, &value).await?;
        self.transition(SearchState::ValueEntered);

        apply_filters(self.driver, self.request.active_filters(), self.timeouts).await?;
        self.transition(SearchState::FiltersApplied);

        let submit = self
            .driver
            .wait_until_clickable(SEARCH_BTN, self.timeouts.element())
            .await?;
        self.driver.click(&submit).await?;
        self.transition(SearchState::Submitted);

        self.disambiguate(&value).await
    }

    async fn disambiguate(&mut self, query: &str) -> Result<Disambiguation, SearchError> {
        // The counter keeps its previous value until the result list re-renders.
        settle(self.timeouts.settle()).await;

        let text = self.read_result_count().await?;

        let Some(count) = parse_result_count(&text) else {
            warn!("Unreadable result count '{}' for '{}'", text, query);
            return Ok(Disambiguation::NoResults);
        };

        match ResultGate::evaluate(count)? {
            GateOutcome::NoResults => {
                info!("No results found for '{}'", query);
                return Ok(Disambiguation::NoResults);
            }
            GateOutcome::TooMany => {
                warn!(
                    "Found {} results for '{}', exceeds maximum of {}",
                    count, query, MAX_THRESHOLD
                );
                return Ok(Disambiguation::TooMany { count });
            }
            GateOutcome::Proceed => info!("Validated {} results for '{}'", count, query),
        }

        let names = self.driver.find_all(RESULT_NAMES).await?;
        let identifiers = self.driver.find_all(RESULT_IDENTIFIERS).await?;
        if names.len() != identifiers.len() {
            return Err(SearchError::ResultListMismatch {
                names: names.len(),
                identifiers: identifiers.len(),
            });
        }

        let matcher = IdentityMatcher::new(
            self.request.target_name(),
            self.request.target_identifier(),
        );

        for (name, identifier) in names.iter().zip(&identifiers) {
            let candidate = Candidate::new(
                &self.driver.read_text(name).await?,
                &self.driver.read_text(identifier).await?,
            );
            let matched = matcher.matches(&candidate);
            debug!(
                "Candidate '{}' ({}): {}",
                candidate.display_name,
                candidate.display_identifier,
                if matched { "match" } else { "no match" }
            );

            if matched {
                info!("Match found: '{}'", candidate.display_name);
                self.driver.click(name).await?;
                self.transition(SearchState::Disambiguated { matched: true });
                return Ok(Disambiguation::Located(candidate));
            }
        }

        info!("No candidate matched '{}'", self.request.target_name());
        self.transition(SearchState::Disambiguated { matched: false });
        Ok(Disambiguation::NoMatch)
    }

    /// Poll the result counter until it shows text. The counter is rendered
    /// blank until the result list arrives.
    async fn read_result_count(&self) -> Result<String, SearchError> {
        let driver = self.driver;
        let text = poll_until(
            &RESULT_COUNT.to_string(),
            self.timeouts.results(),
            self.timeouts.poll_interval(),
            move || async move {
                let Some(counter) = driver.find(RESULT_COUNT).await? else {
                    return Ok(None);
                };
                let text = driver.read_text(&counter).await?;
                Ok((!text.trim().is_empty()).then_some(text))
            },
        )
        .await?;
        Ok(text)
    }

    fn transition(&mut self, next: SearchState) {
        debug!("Search state: {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
