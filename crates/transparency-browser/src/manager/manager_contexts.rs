//! Browsing context bookkeeping: open, close and switch tabs.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::cdp::{close_on_failure, PageSession, ScreenshotFormat};
use super::manager_core::ContextState;
use super::{BrowserError, BrowserManager};

impl BrowserManager {
    /// Open `url` in a new tab and make it current.
    pub async fn open_context(&self, url: &str) -> Result<String, BrowserError> {
        let client = self.client().await?;
        let session = client.new_page(url).await?;
        let loaded = session.wait_for_load().await;
        close_on_failure(loaded, || client.close_page(session.target_id())).await?;

        let handle = session.target_id().to_string();
        self.contexts.write().await.push(ContextState {
            handle: handle.clone(),
            session: Arc::new(session),
        });
        *self.current.write().await = Some(handle.clone());

        debug!("Opened context {}: {}", handle, url);
        Ok(handle)
    }

    /// Close the current tab. No tab is current afterwards.
    pub async fn close_current(&self) -> Result<(), BrowserError> {
        let handle = self
            .current
            .write()
            .await
            .take()
            .ok_or(BrowserError::NoCurrentContext)?;

        let removed = {
            let mut contexts = self.contexts.write().await;
            contexts
                .iter()
                .position(|c| c.handle == handle)
                .map(|index| contexts.remove(index))
        };

        if removed.is_some() {
            self.client().await?.close_page(&handle).await?;
        }
        debug!("Closed context {}", handle);
        Ok(())
    }

    /// Make an open tab current.
    pub async fn switch_to(&self, handle: &str) -> Result<(), BrowserError> {
        if !self.contexts.read().await.iter().any(|c| c.handle == handle) {
            return Err(BrowserError::ContextNotFound(handle.to_string()));
        }

        self.client().await?.activate_page(handle).await?;
        *self.current.write().await = Some(handle.to_string());
        debug!("Switched to context {}", handle);
        Ok(())
    }

    /// Open tabs in creation order.
    pub async fn context_handles(&self) -> Vec<String> {
        self.contexts
            .read()
            .await
            .iter()
            .map(|c| c.handle.clone())
            .collect()
    }

    pub async fn current_handle(&self) -> Result<String, BrowserError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NoCurrentContext)
    }

    /// Session of the current tab.
    pub async fn current_session(&self) -> Result<Arc<PageSession>, BrowserError> {
        let handle = self.current_handle().await?;
        self.contexts
            .read()
            .await
            .iter()
            .find(|c| c.handle == handle)
            .map(|c| c.session.clone())
            .ok_or(BrowserError::ContextNotFound(handle))
    }

    /// Full-page PNG of the current tab.
    pub async fn capture_page(&self) -> Result<Vec<u8>, BrowserError> {
        let session = self.current_session().await?;
        let data = session.screenshot(ScreenshotFormat::Png, true, None).await?;
        STANDARD
            .decode(data)
            .map_err(|e| BrowserError::ActionFailed(format!("Invalid screenshot data: {}", e)))
    }
}
