use crate::error::{BrowserError, Result};
use regex::Regex;
use std::time::Duration;

/// Page-level browser actions every page object builds on.
///
/// Selectors are CSS and are re-resolved on every call. Every wait takes an
/// explicit bound and fails with [`BrowserError::Timeout`] once it elapses.
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait until the DOM is parsed (not network idle).
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until the document has left the `loading` state.
    async fn wait_for_dom_ready(&self, timeout: Duration) -> Result<()>;

    /// Wait until the current URL matches `pattern`.
    async fn wait_for_url(&self, pattern: &Regex, timeout: Duration) -> Result<()>;

    /// Wait for the first element matching `selector` to be visible.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Scroll the first matching element into the viewport.
    async fn scroll_into_view(&self, selector: &str) -> Result<()>;

    /// Click the first matching element.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Replace the value of the first matching input.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Current value of the first matching input.
    async fn input_value(&self, selector: &str) -> Result<String>;

    /// Raw text content of the first matching element.
    async fn text_content(&self, selector: &str) -> Result<String>;

    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Outer HTML of the `index`-th (0-based) element matching `selector`.
    async fn outer_html(&self, selector: &str, index: usize) -> Result<String>;

    /// Click the first `inner` match inside the `index`-th `selector` match.
    async fn click_within(&self, selector: &str, index: usize, inner: &str) -> Result<()>;

    /// Select `value` in the first matching `<select>`.
    async fn select_option(&self, selector: &str, value: &str) -> Result<()>;

    /// Current page URL.
    async fn current_url(&self) -> Result<String>;

    /// Document title.
    async fn title(&self) -> Result<String>;

    /// Take a PNG screenshot of the viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Close the page. Further calls fail with [`BrowserError::SessionClosed`].
    async fn close(&self) -> Result<()>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}

/// Cookie domain for a site root: the host with a leading `www.` dropped and a
/// leading dot added, so the cookie applies to every subdomain.
pub fn cookie_domain(url: &str) -> Result<String> {
    let host = extract_domain(url)?;
    let bare = host.strip_prefix("www.").unwrap_or(&host);
    Ok(format!(".{bare}"))
}
