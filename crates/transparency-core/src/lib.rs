//! Person search and resource extraction for the federal transparency portal.
//!
//! A search is driven entirely through a [`BrowserDriver`]:
//!
//! 1. [`Portal`] loads the landing page and walks to the person search form.
//! 2. [`SearchOrchestrator`] types the query, applies filters, submits and
//!    picks the result that matches the target's name and identifier.
//! 3. [`TablePager`] scrapes the person's resource tables, and
//!    [`DetailSessionManager`] follows each detail link in its own context.
//! 4. [`RecordNormalizer`] and [`ReportBuilder`] turn the rows into a
//!    [`Report`], optionally persisted as JSON.
//!
//! [`search`] runs the whole pipeline.

pub mod detail;
pub mod driver;
pub mod error;
pub mod filters;
pub mod gate;
pub mod identity;
pub mod normalizer;
pub mod orchestrator;
pub mod pager;
pub mod portal;
pub mod report;
pub mod request;
pub mod retry;
pub mod selectors;
pub mod service;
pub mod table;
pub mod wait;

#[cfg(test)]
mod fake_driver;

pub use detail::{DetailSessionManager, DetailSource};
pub use driver::{BrowserDriver, ContextHandle, ElementHandle, Locator, SessionRestorer};
pub use error::{DriverError, SearchError};
pub use gate::{GateOutcome, ResultGate, MAX_THRESHOLD};
pub use identity::{matches, normalize_identifier, normalize_name, Candidate, IdentityMatcher};
pub use normalizer::{CanonicalRecord, RecordNormalizer};
pub use orchestrator::{Disambiguation, SearchOrchestrator, SearchState};
pub use pager::TablePager;
pub use portal::Portal;
pub use report::{Report, ReportBuilder, ReportDocument, ReportRecord};
pub use request::{FilterKind, SearchMode, SearchRequest};
pub use retry::RetryPolicy;
pub use service::{search, PersonSearchService, SearchSettings};
pub use table::{RawRow, RawTable};
