//! [`PageDriver`] over a chromiumoxide page.
//!
//! DOM queries go through small JavaScript snippets evaluated in the page so
//! that visibility, text and value semantics match what a user would see.

use crate::actions::PageDriver;
use crate::error::{BrowserError, Result};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a DOM lookup script. Scripts never return `null`, which CDP
/// reports as a missing value.
#[derive(Debug, Deserialize)]
struct Lookup {
    found: bool,
    #[serde(default)]
    value: String,
}

impl Lookup {
    fn into_found(self, what: impl FnOnce() -> String) -> Result<String> {
        if self.found {
            Ok(self.value)
        } else {
            Err(BrowserError::SelectorNotFound(what()))
        }
    }
}

/// A single browser tab driven over CDP.
pub struct CdpPage {
    page: Page,
    closed: AtomicBool,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(BrowserError::SessionClosed("page already closed".to_string()))
        } else {
            Ok(())
        }
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.ensure_open()?;
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    /// Poll `probe` until it yields `true` or `timeout` elapses.
    async fn poll_until<F, Fut>(&self, what: &str, timeout: Duration, mut probe: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let waited = tokio::time::timeout(timeout, async {
            loop {
                match probe().await {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(e @ BrowserError::SessionClosed(_)) => return Err(e),
                    Err(e) => tracing::trace!("Probe for {} failed: {}", what, e),
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        match waited {
            Ok(result) => result,
            Err(_) => Err(BrowserError::Timeout(format!(
                "{what} not satisfied within {}ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn is_visible_now(&self, selector: &str) -> Result<bool> {
        self.eval(format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const style = window.getComputedStyle(el); \
             if (style.visibility === 'hidden' || style.display === 'none') return false; \
             const rect = el.getBoundingClientRect(); \
             return rect.width > 0 && rect.height > 0; }})()",
            sel = js_string(selector)?
        ))
        .await
    }

    async fn find_first(&self, selector: &str) -> Result<chromiumoxide::Element> {
        self.ensure_open()?;
        self.page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::SelectorNotFound(format!("{selector}: {e}")))
    }
}

#[async_trait::async_trait]
impl PageDriver for CdpPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        self.ensure_open()?;
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;

        if let Some(error_text) = &response.result.error_text {
            return Err(BrowserError::NavigationError(format!(
                "{url}: {error_text}"
            )));
        }

        self.wait_for_dom_ready(timeout).await
    }

    async fn wait_for_dom_ready(&self, timeout: Duration) -> Result<()> {
        self.poll_until("DOM ready", timeout, || async {
            let state: String = self.eval("document.readyState".to_string()).await?;
            Ok(state != "loading")
        })
        .await
    }

    async fn wait_for_url(&self, pattern: &Regex, timeout: Duration) -> Result<()> {
        self.poll_until(&format!("URL matching {pattern}"), timeout, || async {
            Ok(pattern.is_match(&self.current_url().await?))
        })
        .await
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.poll_until(&format!("{selector} visible"), timeout, || {
            self.is_visible_now(selector)
        })
        .await
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<()> {
        let element = self.find_first(selector).await?;
        element
            .scroll_into_view()
            .await
            .map_err(|e| BrowserError::InteractionError {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.find_first(selector).await?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::InteractionError {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let lookup: Lookup = self
            .eval(format!(
                "(() => {{ const el = document.querySelector({sel}); \
                 if (!el) return {{ found: false }}; \
                 el.focus(); \
                 el.value = {val}; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return {{ found: true, value: String(el.value) }}; }})()",
                sel = js_string(selector)?,
                val = js_string(value)?
            ))
            .await?;
        lookup.into_found(|| selector.to_string()).map(|_| ())
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        let lookup: Lookup = self
            .eval(format!(
                "(() => {{ const el = document.querySelector({sel}); \
                 if (!el || !('value' in el)) return {{ found: false }}; \
                 return {{ found: true, value: String(el.value) }}; }})()",
                sel = js_string(selector)?
            ))
            .await?;
        lookup.into_found(|| selector.to_string())
    }

    async fn text_content(&self, selector: &str) -> Result<String> {
        let lookup: Lookup = self
            .eval(format!(
                "(() => {{ const el = document.querySelector({sel}); \
                 if (!el) return {{ found: false }}; \
                 return {{ found: true, value: el.textContent || '' }}; }})()",
                sel = js_string(selector)?
            ))
            .await?;
        lookup.into_found(|| selector.to_string())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.eval(format!(
            "document.querySelectorAll({sel}).length",
            sel = js_string(selector)?
        ))
        .await
    }

    async fn outer_html(&self, selector: &str, index: usize) -> Result<String> {
        let lookup: Lookup = self
            .eval(format!(
                "(() => {{ const el = document.querySelectorAll({sel})[{index}]; \
                 if (!el) return {{ found: false }}; \
                 return {{ found: true, value: el.outerHTML }}; }})()",
                sel = js_string(selector)?
            ))
            .await?;
        lookup.into_found(|| format!("{selector} [{index}]"))
    }

    async fn click_within(&self, selector: &str, index: usize, inner: &str) -> Result<()> {
        self.ensure_open()?;
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::SelectorNotFound(format!("{selector}: {e}")))?;
        let container = elements
            .get(index)
            .ok_or_else(|| BrowserError::SelectorNotFound(format!("{selector} [{index}]")))?;

        let target = container
            .find_element(inner)
            .await
            .map_err(|e| BrowserError::SelectorNotFound(format!("{inner} in {selector}: {e}")))?;

        let interaction = |e: chromiumoxide::error::CdpError| BrowserError::InteractionError {
            selector: format!("{selector} [{index}] {inner}"),
            reason: e.to_string(),
        };
        target.scroll_into_view().await.map_err(interaction)?;
        target.click().await.map_err(interaction)?;
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let outcome: String = self
            .eval(format!(
                "(() => {{ const el = document.querySelector({sel}); \
                 if (!el) return 'missing'; \
                 const v = {val}; \
                 if (!Array.from(el.options || []).some(o => o.value === v)) return 'no-option'; \
                 el.value = v; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return 'ok'; }})()",
                sel = js_string(selector)?,
                val = js_string(value)?
            ))
            .await?;

        match outcome.as_str() {
            "ok" => Ok(()),
            "missing" => Err(BrowserError::SelectorNotFound(selector.to_string())),
            _ => Err(BrowserError::InteractionError {
                selector: selector.to_string(),
                reason: format!("no option with value '{value}'"),
            }),
        }
    }

    async fn current_url(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn title(&self) -> Result<String> {
        self.eval("document.title".to_string()).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let bytes = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build(),
            )
            .await?;
        Ok(bytes)
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("Closing page");
        self.page.clone().close().await?;
        Ok(())
    }
}

/// Quote `s` as a JavaScript string literal.
fn js_string(s: &str) -> Result<String> {
    serde_json::to_string(s).map_err(|e| BrowserError::ScriptError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(
            js_string(r#"[aria-label="Amazon Prime"]"#).unwrap(),
            r#""[aria-label=\"Amazon Prime\"]""#
        );
        assert_eq!(js_string("it's").unwrap(), r#""it's""#);
    }
}
