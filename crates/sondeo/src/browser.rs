//! Chromium session over the DevTools protocol.
//!
//! Compiled with the `browser` feature. [`ChromiumSession`] drives the async
//! `chromiumoxide` client from the synchronous [`Session`] interface by
//! blocking on a private single-worker Tokio runtime inside every call.
//!
//! Located nodes live in a [`Registry`] keyed by handle id. Navigating,
//! clicking, submitting, or a changed address seen by a lookup empties it, so
//! handles from before become stale.

#![allow(clippy::cast_possible_truncation)]

use crate::config::BrowserConfig;
use crate::handles::{is_no_match, Registry};
use crate::locator::{Locator, Query};
use crate::result::{SondeoError, SondeoResult};
use crate::session::{ElementHandle, Session};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::future::Future;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const JS_IS_DISPLAYED: &str = "function() { \
    const style = window.getComputedStyle(this); \
    const rect = this.getBoundingClientRect(); \
    return style.display !== 'none' && style.visibility !== 'hidden' \
        && rect.width > 0 && rect.height > 0; }";

const JS_IS_ENABLED: &str = "function() { return !this.disabled; }";

const JS_VALUE: &str = "function() { return this.value === undefined ? null : String(this.value); }";

const JS_CLEAR: &str = "function() { \
    this.value = ''; \
    this.dispatchEvent(new Event('input', { bubbles: true })); }";

/// A live Chromium tab
pub struct ChromiumSession {
    runtime: Runtime,
    browser: RefCell<Option<CdpBrowser>>,
    page: CdpPage,
    handler: JoinHandle<()>,
    elements: RefCell<Registry<Element>>,
}

impl fmt::Debug for ChromiumSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumSession")
            .field("elements", &self.elements.borrow().len())
            .finish_non_exhaustive()
    }
}

fn launch_error(e: impl fmt::Display) -> SondeoError {
    SondeoError::BrowserLaunch {
        message: e.to_string(),
    }
}

fn cdp_error(e: CdpError) -> SondeoError {
    SondeoError::session(e.to_string())
}

impl ChromiumSession {
    /// Launch Chromium and open a blank tab
    pub fn launch(config: &BrowserConfig) -> SondeoResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(launch_error)?;

        let mut builder = CdpConfig::builder().window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if config.disable_dev_shm {
            builder = builder.arg("--disable-dev-shm-usage");
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(launch_error)?;

        let (browser, mut handler) = runtime
            .block_on(CdpBrowser::launch(cdp_config))
            .map_err(launch_error)?;

        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(launch_error)?;

        info!(
            headless = config.headless,
            width = config.window_width,
            height = config.window_height,
            "chromium launched"
        );

        Ok(Self {
            runtime,
            browser: RefCell::new(Some(browser)),
            page,
            handler,
            elements: RefCell::new(Registry::new()),
        })
    }

    fn block<T>(&self, fut: impl Future<Output = Result<T, CdpError>>) -> SondeoResult<T> {
        self.runtime.block_on(fut).map_err(cdp_error)
    }

    fn element(&self, handle: &ElementHandle) -> SondeoResult<Ref<'_, Element>> {
        Ref::filter_map(self.elements.borrow(), |elements| elements.get(handle)).map_err(|_| {
            SondeoError::StaleElement {
                id: handle.id().to_string(),
            }
        })
    }

    /// Run an input that may navigate, then retire every handle
    fn dispatch(
        &self,
        handle: &ElementHandle,
        action: impl FnOnce(&Element) -> SondeoResult<()>,
    ) -> SondeoResult<()> {
        let outcome = {
            let element = self.element(handle)?;
            action(&*element)
        };
        self.elements.borrow_mut().invalidate();
        outcome
    }

    fn call_js(&self, handle: &ElementHandle, function: &str) -> SondeoResult<Option<serde_json::Value>> {
        let element = self.element(handle)?;
        let returns = self.block(element.call_js_fn(function, false))?;
        Ok(returns.result.value)
    }

    fn call_js_bool(&self, handle: &ElementHandle, function: &str) -> SondeoResult<bool> {
        Ok(self
            .call_js(handle, function)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

impl Session for ChromiumSession {
    fn navigate(&self, url: &str) -> SondeoResult<()> {
        info!(url, "navigating");
        self.runtime
            .block_on(self.page.goto(url))
            .map_err(|e| SondeoError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.elements.borrow_mut().invalidate();
        Ok(())
    }

    fn find_elements(&self, locator: &Locator) -> SondeoResult<Vec<ElementHandle>> {
        let url = self.block(self.page.url())?.unwrap_or_default();
        self.elements.borrow_mut().observe_url(&url);

        let found = match locator.to_query() {
            Query::Css(css) => self.runtime.block_on(self.page.find_elements(css)),
            Query::XPath(xpath) => self.runtime.block_on(self.page.find_xpaths(xpath)),
        };
        match found {
            Ok(found) => Ok(self.elements.borrow_mut().register(found)),
            Err(err) if is_no_match(&err.to_string()) => {
                debug!(%locator, error = %err, "no match");
                Ok(Vec::new())
            }
            Err(err) => Err(cdp_error(err)),
        }
    }

    fn click(&self, element: &ElementHandle) -> SondeoResult<()> {
        self.dispatch(element, |el| self.block(el.click()).map(|_| ()))
    }

    fn clear(&self, element: &ElementHandle) -> SondeoResult<()> {
        self.call_js(element, JS_CLEAR).map(|_| ())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> SondeoResult<()> {
        let el = self.element(element)?;
        self.block(el.type_str(text))?;
        Ok(())
    }

    fn submit(&self, element: &ElementHandle) -> SondeoResult<()> {
        self.dispatch(element, |el| self.block(el.press_key("Enter")).map(|_| ()))
    }

    fn text(&self, element: &ElementHandle) -> SondeoResult<String> {
        let el = self.element(element)?;
        Ok(self.block(el.inner_text())?.unwrap_or_default())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> SondeoResult<Option<String>> {
        if name == "value" {
            return Ok(self
                .call_js(element, JS_VALUE)?
                .and_then(|v| v.as_str().map(str::to_string)));
        }
        let el = self.element(element)?;
        self.block(el.attribute(name))
    }

    fn is_displayed(&self, element: &ElementHandle) -> SondeoResult<bool> {
        self.call_js_bool(element, JS_IS_DISPLAYED)
    }

    fn is_enabled(&self, element: &ElementHandle) -> SondeoResult<bool> {
        self.call_js_bool(element, JS_IS_ENABLED)
    }

    fn title(&self) -> SondeoResult<String> {
        Ok(self.block(self.page.get_title())?.unwrap_or_default())
    }

    fn current_url(&self) -> SondeoResult<String> {
        Ok(self.block(self.page.url())?.unwrap_or_default())
    }

    fn close(&self) -> SondeoResult<()> {
        self.elements.borrow_mut().invalidate();
        let Some(mut browser) = self.browser.borrow_mut().take() else {
            return Ok(());
        };
        let closed = self.runtime.block_on(async {
            browser.close().await?;
            browser.wait().await.map_err(CdpError::from)
        });
        self.handler.abort();
        if let Err(ref err) = closed {
            warn!(error = %err, "browser did not close cleanly");
        }
        closed.map(|_| ()).map_err(cdp_error)
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if self.browser.borrow().is_some() {
            let _ = Session::close(self);
        }
    }
}
