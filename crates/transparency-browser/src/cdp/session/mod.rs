//! CDP session attached to a single tab.

mod core;
mod input;
mod js;
mod navigation;
mod network;

pub use self::core::PageSession;
