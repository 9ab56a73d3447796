//! [`BrowserDriver`] over the current CDP tab.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::debug;

use transparency_core::wait::poll_until;
use transparency_core::{BrowserDriver, ContextHandle, DriverError, ElementHandle, Locator};

use crate::cdp::{PageSession, ScreenshotFormat};
use crate::manager::{BrowserError, BrowserManager};
use crate::script;

impl BrowserManager {
    async fn session(&self) -> Result<Arc<PageSession>, DriverError> {
        Ok(self.current_session().await?)
    }

    async fn eval(&self, expression: &str) -> Result<Value, DriverError> {
        let session = self.session().await?;
        session
            .evaluate(expression)
            .await
            .map_err(|e| BrowserError::from(e).into())
    }

    async fn eval_on(&self, handle: &ElementHandle, body: &str) -> Result<Value, DriverError> {
        let result = self.eval(&script::on_element(handle, body)).await?;
        script::element_value(handle, result)
    }

    async fn count(&self, locator: Locator) -> Result<usize, DriverError> {
        let result = self.eval(&script::count(locator)).await?;
        Ok(result.as_u64().unwrap_or(0) as usize)
    }

    async fn is_clickable(&self, handle: &ElementHandle) -> Result<bool, DriverError> {
        Ok(self.eval_on(handle, script::CLICKABLE).await?.as_bool() == Some(true))
    }
}

#[async_trait]
impl BrowserDriver for BrowserManager {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let session = self.session().await?;
        session.navigate(url).await.map_err(BrowserError::from)?;
        Ok(())
    }

    async fn find(&self, locator: Locator) -> Result<Option<ElementHandle>, DriverError> {
        Ok((self.count(locator).await? > 0).then(|| ElementHandle::new(locator, 0)))
    }

    async fn find_all(&self, locator: Locator) -> Result<Vec<ElementHandle>, DriverError> {
        let count = self.count(locator).await?;
        Ok((0..count).map(|index| ElementHandle::new(locator, index)).collect())
    }

    async fn wait_until_clickable(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        let handle = &ElementHandle::new(locator, 0);
        poll_until(&locator.to_string(), timeout, self.config().poll_interval, move || async move {
            Ok(self.is_clickable(handle).await?.then(|| handle.clone()))
        })
        .await
    }

    async fn wait_until_present(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        poll_until(&locator.to_string(), timeout, self.config().poll_interval, move || {
            self.find(locator)
        })
        .await
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let value = self.eval_on(element, script::CLICK_POINT).await?;
        let (x, y) = script::point(&value)?;
        let session = self.session().await?;
        session.click(x, y).await.map_err(BrowserError::from)?;
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.eval_on(element, script::FOCUS_AND_CLEAR).await?;
        let session = self.session().await?;
        session.type_text(text).await.map_err(BrowserError::from)?;
        Ok(())
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let value = self.eval_on(element, script::TEXT).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let value = self.eval_on(element, &script::attribute(name)).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn read_page_markup(&self) -> Result<String, DriverError> {
        let session = self.session().await?;
        Ok(session.get_content().await.map_err(BrowserError::from)?)
    }

    async fn screenshot(&self, element: &ElementHandle) -> Result<Vec<u8>, DriverError> {
        let rect = script::clip(self.eval_on(element, script::DOCUMENT_RECT).await?)?;
        if !rect.is_visible() {
            return Err(DriverError::Browser(format!("{} has no visible area", element.locator)));
        }

        let session = self.session().await?;
        let data = session
            .screenshot(ScreenshotFormat::Png, false, Some(rect))
            .await
            .map_err(BrowserError::from)?;
        STANDARD
            .decode(data)
            .map_err(|e| DriverError::Browser(format!("Invalid screenshot data: {}", e)))
    }

    async fn open_new_context(&self, url: &str) -> Result<ContextHandle, DriverError> {
        Ok(ContextHandle(self.open_context(url).await?))
    }

    async fn close_current_context(&self) -> Result<(), DriverError> {
        Ok(self.close_current().await?)
    }

    async fn switch_to_context(&self, handle: &ContextHandle) -> Result<(), DriverError> {
        Ok(self.switch_to(&handle.0).await?)
    }

    async fn list_context_handles(&self) -> Result<Vec<ContextHandle>, DriverError> {
        Ok(self
            .context_handles()
            .await
            .into_iter()
            .map(ContextHandle)
            .collect())
    }

    async fn current_context(&self) -> Result<ContextHandle, DriverError> {
        Ok(ContextHandle(self.current_handle().await?))
    }

    async fn current_page_title(&self) -> Result<String, DriverError> {
        let session = self.session().await?;
        Ok(session.get_title().await.map_err(BrowserError::from)?)
    }

    async fn execute_script(&self, script: &str) -> Result<Value, DriverError> {
        debug!("Executing script ({} bytes)", script.len());
        self.eval(script).await
    }
}
