//! Chrome DevTools Protocol client.
//!
//! Talks to Chrome over the browser-level WebSocket and multiplexes page
//! sessions over it with flattened `sessionId`s.

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub(crate) use client::close_on_failure;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
