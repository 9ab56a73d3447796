//! Chrome DevTools Protocol backend for the transparency portal search.
//!
//! [`BrowserManager`] launches (or attaches to) a Chrome instance with remote
//! debugging enabled, tracks the open tabs as browsing contexts and implements
//! [`transparency_core::BrowserDriver`] on top of them.
//!
//! ```text
//! ┌──────────────────┐    WebSocket     ┌──────────────────┐
//! │ transparency-core│ ◄──────────────► │   Chrome/Edge    │
//! │  BrowserManager  │       CDP        │ (launched by us) │
//! └──────────────────┘                  └──────────────────┘
//! ```
//!
//! Elements are addressed the way the search pipeline addresses them: a
//! locator plus the index of the match. Every interaction re-resolves the
//! element in the page, so a re-render shows up as a stale handle rather
//! than a dangling remote object.

pub mod cdp;
mod driver;
pub mod manager;
mod script;
pub mod session_state;

pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
pub use session_state::{
    capture_session_state, load_cookies, load_local_storage, PersistedSession, SessionPaths,
    SessionStateError,
};
