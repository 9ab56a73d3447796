//! Cookie access for CDP page session.

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::Cookie;

use super::core::PageSession;

impl PageSession {
    /// Every cookie in the browser, not only those for the current page.
    pub async fn get_all_cookies(&self) -> Result<Vec<Cookie>, CdpError> {
        let result = self.call("Network.getAllCookies", None).await?;
        let cookies: Vec<Cookie> = serde_json::from_value(result["cookies"].clone())?;
        Ok(cookies)
    }

    pub async fn set_cookies(&self, cookies: &[Cookie]) -> Result<(), CdpError> {
        if cookies.is_empty() {
            return Ok(());
        }
        self.call("Network.setCookies", Some(json!({"cookies": cookies})))
            .await?;
        debug!("Set {} cookies", cookies.len());
        Ok(())
    }
}
