//! Browser instance manager.
//!
//! Launches Chrome with a persistent profile when nothing is listening on the
//! debug port, and keeps the open tabs as an ordered list of browsing
//! contexts with one of them current.

mod manager_contexts;
mod manager_core;
mod manager_types;

pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
