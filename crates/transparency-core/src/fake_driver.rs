//! Scripted in-memory browser used by the unit tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::driver::{BrowserDriver, ContextHandle, ElementHandle, Locator};
use crate::error::DriverError;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub clickable: bool,
    /// Page the current context shows after a click.
    pub leads_to: Option<String>,
    /// Reads that return an empty string before `text` shows up.
    pub blank_reads: u32,
}

impl FakeElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            clickable: true,
            ..Default::default()
        }
    }

    pub fn button(leads_to: &str) -> Self {
        Self {
            clickable: true,
            leads_to: Some(leads_to.to_string()),
            ..Default::default()
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn blank_for(mut self, reads: u32) -> Self {
        self.blank_reads = reads;
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: String,
    pub markup: String,
    pub elements: HashMap<Locator, Vec<FakeElement>>,
    /// Reading the markup of this page fails with a browser error.
    pub broken: bool,
}

impl FakePage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_markup(mut self, markup: &str) -> Self {
        self.markup = markup.to_string();
        self
    }

    pub fn with(mut self, locator: Locator, element: FakeElement) -> Self {
        self.elements.entry(locator).or_default().push(element);
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

#[derive(Debug, Default)]
struct State {
    pages: HashMap<String, FakePage>,
    /// Open contexts in creation order with the page each one shows.
    contexts: Vec<(ContextHandle, String)>,
    current: Option<ContextHandle>,
    next_context: usize,
    fail_open: bool,
    fail_close: bool,
    opened: Vec<String>,
    closed: Vec<ContextHandle>,
    clicks: Vec<Locator>,
    typed: Vec<(Locator, String)>,
    scripts: Vec<String>,
}

/// Multi-context fake browser. Pages are keyed by URL or by a short name
/// used in `FakeElement::leads_to`.
#[derive(Debug, Default)]
pub struct FakeDriver {
    state: Mutex<State>,
}

impl FakeDriver {
    /// A browser with one context showing `start`.
    pub fn new(start: &str) -> Self {
        let driver = Self::default();
        {
            let mut state = driver.state.lock();
            let handle = ContextHandle("ctx-0".to_string());
            state.contexts.push((handle.clone(), start.to_string()));
            state.current = Some(handle);
            state.next_context = 1;
        }
        driver
    }

    pub fn with_page(self, key: &str, page: FakePage) -> Self {
        self.state.lock().pages.insert(key.to_string(), page);
        self
    }

    pub fn fail_open(self) -> Self {
        self.state.lock().fail_open = true;
        self
    }

    pub fn fail_close(self) -> Self {
        self.state.lock().fail_close = true;
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().opened.clone()
    }

    pub fn closed(&self) -> Vec<ContextHandle> {
        self.state.lock().closed.clone()
    }

    pub fn clicks(&self) -> Vec<Locator> {
        self.state.lock().clicks.clone()
    }

    pub fn typed(&self) -> Vec<(Locator, String)> {
        self.state.lock().typed.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().scripts.clone()
    }

    pub fn open_context_count(&self) -> usize {
        self.state.lock().contexts.len()
    }

    pub fn current_handle(&self) -> Option<ContextHandle> {
        self.state.lock().current.clone()
    }

    pub fn current_page_key(&self) -> Option<String> {
        let state = self.state.lock();
        current_page_key(&state).map(str::to_string)
    }

    fn element(&self, handle: &ElementHandle) -> Result<FakeElement, DriverError> {
        let state = self.state.lock();
        let page = current_page(&state)?;
        page.elements
            .get(&handle.locator)
            .and_then(|list| list.get(handle.index))
            .cloned()
            .ok_or_else(|| DriverError::Stale(handle.locator.to_string()))
    }
}

fn current_page_key(state: &State) -> Option<&str> {
    let current = state.current.as_ref()?;
    state
        .contexts
        .iter()
        .find(|(h, _)| h == current)
        .map(|(_, key)| key.as_str())
}

fn current_page(state: &State) -> Result<&FakePage, DriverError> {
    let key = current_page_key(state)
        .ok_or_else(|| DriverError::NoSuchContext("no current context".to_string()))?;
    state
        .pages
        .get(key)
        .ok_or_else(|| DriverError::Browser(format!("page not scripted: {key}")))
}

fn show(state: &mut State, key: &str) -> Result<(), DriverError> {
    let current = state
        .current
        .clone()
        .ok_or_else(|| DriverError::NoSuchContext("no current context".to_string()))?;
    if let Some(entry) = state.contexts.iter_mut().find(|(h, _)| *h == current) {
        entry.1 = key.to_string();
    }
    Ok(())
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        show(&mut self.state.lock(), url)
    }

    async fn find(&self, locator: Locator) -> Result<Option<ElementHandle>, DriverError> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    async fn find_all(&self, locator: Locator) -> Result<Vec<ElementHandle>, DriverError> {
        let state = self.state.lock();
        let page = current_page(&state)?;
        let count = page.elements.get(&locator).map_or(0, Vec::len);
        Ok((0..count).map(|i| ElementHandle::new(locator, i)).collect())
    }

    async fn wait_until_clickable(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        let handle = self.wait_until_present(locator, timeout).await?;
        if self.element(&handle)?.clickable {
            Ok(handle)
        } else {
            Err(DriverError::Timeout {
                locator: locator.to_string(),
                timeout,
            })
        }
    }

    async fn wait_until_present(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        self.find(locator).await?.ok_or(DriverError::Timeout {
            locator: locator.to_string(),
            timeout,
        })
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let target = self.element(element)?;
        let mut state = self.state.lock();
        state.clicks.push(element.locator);
        if let Some(key) = &target.leads_to {
            show(&mut state, key)?;
        }
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.element(element)?;
        self.state
            .lock()
            .typed
            .push((element.locator, text.to_string()));
        Ok(())
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let mut state = self.state.lock();
        let key = current_page_key(&state)
            .map(str::to_string)
            .ok_or_else(|| DriverError::NoSuchContext("no current context".to_string()))?;
        let page = state
            .pages
            .get_mut(&key)
            .ok_or_else(|| DriverError::Browser(format!("page not scripted: {key}")))?;
        let target = page
            .elements
            .get_mut(&element.locator)
            .and_then(|list| list.get_mut(element.index))
            .ok_or_else(|| DriverError::Stale(element.locator.to_string()))?;

        if target.blank_reads > 0 {
            target.blank_reads -= 1;
            return Ok(String::new());
        }
        Ok(target.text.clone())
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        Ok(self.element(element)?.attrs.get(name).cloned())
    }

    async fn read_page_markup(&self) -> Result<String, DriverError> {
        let state = self.state.lock();
        let page = current_page(&state)?;
        if page.broken {
            return Err(DriverError::Browser("renderer crashed".to_string()));
        }
        Ok(page.markup.clone())
    }

    async fn screenshot(&self, element: &ElementHandle) -> Result<Vec<u8>, DriverError> {
        self.element(element)?;
        Ok(b"\x89PNG".to_vec())
    }

    async fn open_new_context(&self, url: &str) -> Result<ContextHandle, DriverError> {
        let mut state = self.state.lock();
        if state.fail_open {
            return Err(DriverError::Browser("popup blocked".to_string()));
        }
        let handle = ContextHandle(format!("ctx-{}", state.next_context));
        state.next_context += 1;
        state.contexts.push((handle.clone(), url.to_string()));
        state.opened.push(url.to_string());
        state.current = Some(handle.clone());
        Ok(handle)
    }

    async fn close_current_context(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.fail_close {
            return Err(DriverError::Browser("close refused".to_string()));
        }
        let current = state
            .current
            .take()
            .ok_or_else(|| DriverError::NoSuchContext("no current context".to_string()))?;
        state.contexts.retain(|(h, _)| *h != current);
        state.closed.push(current);
        Ok(())
    }

    async fn switch_to_context(&self, handle: &ContextHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if !state.contexts.iter().any(|(h, _)| h == handle) {
            return Err(DriverError::NoSuchContext(handle.to_string()));
        }
        state.current = Some(handle.clone());
        Ok(())
    }

    async fn list_context_handles(&self) -> Result<Vec<ContextHandle>, DriverError> {
        Ok(self
            .state
            .lock()
            .contexts
            .iter()
            .map(|(h, _)| h.clone())
            .collect())
    }

    async fn current_context(&self) -> Result<ContextHandle, DriverError> {
        self.state
            .lock()
            .current
            .clone()
            .ok_or_else(|| DriverError::NoSuchContext("no current context".to_string()))
    }

    async fn current_page_title(&self) -> Result<String, DriverError> {
        let state = self.state.lock();
        Ok(current_page(&state)?.title.clone())
    }

    async fn execute_script(&self, script: &str) -> Result<Value, DriverError> {
        self.state.lock().scripts.push(script.to_string());
        Ok(Value::Null)
    }
}
