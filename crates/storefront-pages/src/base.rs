//! Primitives shared by every page object.
//!
//! Page objects hold a [`PageHelper`] rather than extending a base type. The
//! helper owns the page driver, the screenshot directory and the component's
//! logging span.

use crate::error::PageResult;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront_browser::{BrowserError, PageDriver};
use storefront_core::{artifacts, logging, SuiteConfig};
use tracing::Span;

/// Bound for wait-then-act primitives unless the caller passes one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Bound for non-fatal visibility probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Page-driving capability shared by page objects.
#[derive(Clone)]
pub struct PageHelper {
    driver: Arc<dyn PageDriver>,
    screenshots_dir: PathBuf,
    navigation_timeout: Duration,
    span: Span,
}

impl PageHelper {
    pub fn new(driver: Arc<dyn PageDriver>, config: &SuiteConfig, component: &str) -> Self {
        Self {
            driver,
            screenshots_dir: config.screenshots_dir(),
            navigation_timeout: Duration::from_millis(config.timeout_ms),
            span: logging::component(component),
        }
    }

    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Navigate and wait for the DOM to be parsed.
    ///
    /// Network-idle is never awaited: ad and tracking traffic on the target
    /// site keeps the network busy indefinitely.
    pub async fn navigate(&self, url: &str) -> PageResult<()> {
        tracing::info!(parent: &self.span, "Navigating to: {}", url);
        self.driver.goto(url, self.navigation_timeout).await?;
        Ok(())
    }

    /// Wait for `selector` to be visible, scroll it into view and click it.
    ///
    /// On failure a screenshot named after the selector is saved and the
    /// error is returned.
    pub async fn wait_and_click(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        tracing::info!(parent: &self.span, "Clicking element: {}", selector);
        let attempt = async {
            self.driver.wait_for_visible(selector, timeout).await?;
            self.driver.scroll_into_view(selector).await?;
            self.driver.click(selector).await
        };

        if let Err(e) = attempt.await {
            tracing::error!(parent: &self.span, "Failed to click {}: {}", selector, e);
            self.capture_failure(&format!("click_failure_{selector}"))
                .await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Wait for `selector` to be visible and replace its value with `text`.
    ///
    /// Same failure policy as [`Self::wait_and_click`].
    pub async fn wait_and_fill(
        &self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> PageResult<()> {
        tracing::info!(parent: &self.span, "Filling '{}' in {}", text, selector);
        let attempt = async {
            self.driver.wait_for_visible(selector, timeout).await?;
            self.driver.fill(selector, text).await
        };

        if let Err(e) = attempt.await {
            tracing::error!(parent: &self.span, "Failed to fill {}: {}", selector, e);
            self.capture_failure("fill_failure").await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Trimmed text of `selector` once it is visible.
    pub async fn get_text(&self, selector: &str, timeout: Duration) -> PageResult<String> {
        self.driver.wait_for_visible(selector, timeout).await?;
        let text = self.driver.text_content(selector).await?;
        Ok(text.trim().to_string())
    }

    /// Whether `selector` becomes visible within `timeout`. Never fails.
    pub async fn is_visible(&self, selector: &str, timeout: Duration) -> bool {
        match self.driver.wait_for_visible(selector, timeout).await {
            Ok(()) => true,
            Err(BrowserError::Timeout(_)) => false,
            Err(e) => {
                tracing::debug!(parent: &self.span, "Visibility probe for {} failed: {}", selector, e);
                false
            }
        }
    }

    /// Save a screenshot as `<screenshots>/<name>_<timestamp>.png`.
    pub async fn take_screenshot(&self, name: &str) -> PageResult<PathBuf> {
        let bytes = self.driver.screenshot().await?;
        tokio::fs::create_dir_all(&self.screenshots_dir).await?;
        let path = self
            .screenshots_dir
            .join(artifacts::stamped_file_name(name, "png"));
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(parent: &self.span, "Screenshot saved: {}", path.display());
        Ok(path)
    }

    /// Wait for the DOM-parsed state.
    pub async fn wait_for_page_load(&self) -> PageResult<()> {
        self.driver
            .wait_for_dom_ready(self.navigation_timeout)
            .await?;
        Ok(())
    }

    pub async fn page_title(&self) -> PageResult<String> {
        Ok(self.driver.title().await?)
    }

    pub async fn current_url(&self) -> PageResult<String> {
        Ok(self.driver.current_url().await?)
    }

    /// Screenshot for post-mortem debugging. A failure here is logged and
    /// dropped so the original error reaches the caller.
    async fn capture_failure(&self, name: &str) {
        if let Err(e) = self.take_screenshot(name).await {
            tracing::warn!(parent: &self.span, "Could not capture failure screenshot {}: {}", name, e);
        }
    }
}
