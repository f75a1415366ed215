//! In-memory stand-ins for the browser, for tests that should not need Chrome.
//!
//! [`FakePage`] answers [`PageDriver`] calls from static HTML routed by URL,
//! using `scraper` for selector matching. [`FakeBrowser`] hands out contexts
//! wrapping a shared page and counts how often each is closed.

use crate::actions::PageDriver;
use crate::context::{BrowserContext, ContextFactory, ContextOptions};
use crate::error::{BrowserError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// PNG signature returned as screenshot bytes.
pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Default)]
struct FakeState {
    routes: HashMap<String, String>,
    url: String,
    html: String,
    values: HashMap<String, String>,
    click_navigations: HashMap<String, String>,
    failing: HashSet<String>,
    clicks: Vec<String>,
    screenshots: usize,
    fail_screenshots: bool,
    closed: bool,
    close_calls: usize,
}

/// A page backed by routed static HTML.
#[derive(Default)]
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` when navigating to `url`.
    #[must_use]
    pub fn with_route(self, url: &str, html: &str) -> Self {
        self.lock()
            .routes
            .insert(url.to_string(), html.to_string());
        self
    }

    /// Navigate to `url` whenever `selector` is clicked.
    #[must_use]
    pub fn navigate_on_click(self, selector: &str, url: &str) -> Self {
        self.lock()
            .click_navigations
            .insert(selector.to_string(), url.to_string());
        self
    }

    /// Make every interaction with `selector` fail as if it were detached.
    #[must_use]
    pub fn failing(self, selector: &str) -> Self {
        self.lock().failing.insert(selector.to_string());
        self
    }

    /// Make screenshots fail.
    #[must_use]
    pub fn failing_screenshots(self) -> Self {
        self.lock().fail_screenshots = true;
        self
    }

    /// Selectors clicked so far, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    /// Number of screenshots taken.
    pub fn screenshot_count(&self) -> usize {
        self.lock().screenshots
    }

    /// Number of times `close` was called.
    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn open_state(&self) -> Result<MutexGuard<'_, FakeState>> {
        let state = self.lock();
        if state.closed {
            return Err(BrowserError::SessionClosed("page already closed".to_string()));
        }
        Ok(state)
    }

    fn interactable(state: &FakeState, selector: &str) -> Result<()> {
        if state.failing.contains(selector) {
            return Err(BrowserError::InteractionError {
                selector: selector.to_string(),
                reason: "element is not attached to the DOM".to_string(),
            });
        }
        Ok(())
    }

    fn load(state: &mut FakeState, url: &str) -> Result<()> {
        let html = state
            .routes
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::NavigationError(format!("{url}: no route")))?;
        state.url = url.to_string();
        state.html = html;
        state.values.clear();
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::SelectorNotFound(format!("{selector}: {e}")))
}

fn is_displayed(element: &ElementRef<'_>) -> bool {
    let hidden_style = element.value().attr("style").is_some_and(|style| {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    });
    element.value().attr("hidden").is_none() && !hidden_style
}

#[async_trait::async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<()> {
        let mut state = self.open_state()?;
        Self::load(&mut state, url)
    }

    async fn wait_for_dom_ready(&self, _timeout: Duration) -> Result<()> {
        self.open_state().map(|_| ())
    }

    async fn wait_for_url(&self, pattern: &Regex, _timeout: Duration) -> Result<()> {
        let state = self.open_state()?;
        if pattern.is_match(&state.url) {
            Ok(())
        } else {
            Err(BrowserError::Timeout(format!(
                "URL matching {pattern} (current {})",
                state.url
            )))
        }
    }

    async fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> Result<()> {
        let state = self.open_state()?;
        let sel = parse_selector(selector)?;
        let document = Html::parse_document(&state.html);
        let visible = document
            .select(&sel)
            .next()
            .is_some_and(|el| is_displayed(&el));
        if visible {
            Ok(())
        } else {
            Err(BrowserError::Timeout(format!("{selector} visible")))
        }
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<()> {
        let state = self.open_state()?;
        Self::interactable(&state, selector)?;
        let sel = parse_selector(selector)?;
        let document = Html::parse_document(&state.html);
        if document.select(&sel).next().is_some() {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(selector.to_string()))
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.open_state()?;
        Self::interactable(&state, selector)?;
        let sel = parse_selector(selector)?;
        if Html::parse_document(&state.html).select(&sel).next().is_none() {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        state.clicks.push(selector.to_string());
        if let Some(url) = state.click_navigations.get(selector).cloned() {
            Self::load(&mut state, &url)?;
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.open_state()?;
        Self::interactable(&state, selector)?;
        let sel = parse_selector(selector)?;
        if Html::parse_document(&state.html).select(&sel).next().is_none() {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        state.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        let state = self.open_state()?;
        if let Some(value) = state.values.get(selector) {
            return Ok(value.clone());
        }
        let sel = parse_selector(selector)?;
        let document = Html::parse_document(&state.html);
        document
            .select(&sel)
            .next()
            .map(|el| el.value().attr("value").unwrap_or_default().to_string())
            .ok_or_else(|| BrowserError::SelectorNotFound(selector.to_string()))
    }

    async fn text_content(&self, selector: &str) -> Result<String> {
        let state = self.open_state()?;
        let sel = parse_selector(selector)?;
        let document = Html::parse_document(&state.html);
        document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .ok_or_else(|| BrowserError::SelectorNotFound(selector.to_string()))
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let state = self.open_state()?;
        let sel = parse_selector(selector)?;
        Ok(Html::parse_document(&state.html).select(&sel).count())
    }

    async fn outer_html(&self, selector: &str, index: usize) -> Result<String> {
        let state = self.open_state()?;
        let target = format!("{selector} [{index}]");
        Self::interactable(&state, &target)?;
        let sel = parse_selector(selector)?;
        let document = Html::parse_document(&state.html);
        document
            .select(&sel)
            .nth(index)
            .map(|el| el.html())
            .ok_or_else(|| BrowserError::SelectorNotFound(target))
    }

    async fn click_within(&self, selector: &str, index: usize, inner: &str) -> Result<()> {
        let mut state = self.open_state()?;
        let target = format!("{selector} [{index}] {inner}");
        Self::interactable(&state, &target)?;
        let outer = parse_selector(selector)?;
        let inner_sel = parse_selector(inner)?;
        let found = {
            let document = Html::parse_document(&state.html);
            document
                .select(&outer)
                .nth(index)
                .is_some_and(|card| card.select(&inner_sel).next().is_some())
        };
        if !found {
            return Err(BrowserError::SelectorNotFound(target));
        }
        state.clicks.push(target);
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.open_state()?;
        Self::interactable(&state, selector)?;
        let sel = parse_selector(selector)?;
        let option = parse_selector("option")?;
        let has_option = {
            let document = Html::parse_document(&state.html);
            let Some(select) = document.select(&sel).next() else {
                return Err(BrowserError::SelectorNotFound(selector.to_string()));
            };
            select
                .select(&option)
                .any(|o| o.value().attr("value") == Some(value))
        };
        if !has_option {
            return Err(BrowserError::InteractionError {
                selector: selector.to_string(),
                reason: format!("no option with value '{value}'"),
            });
        }
        state.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.open_state()?.url.clone())
    }

    async fn title(&self) -> Result<String> {
        let state = self.open_state()?;
        let sel = parse_selector("title")?;
        let document = Html::parse_document(&state.html);
        Ok(document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let mut state = self.open_state()?;
        if state.fail_screenshots {
            return Err(BrowserError::ChromiumError(
                "screenshot capture failed".to_string(),
            ));
        }
        state.screenshots += 1;
        Ok(FAKE_PNG.to_vec())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.lock();
        state.close_calls += 1;
        state.closed = true;
        Ok(())
    }
}

/// A context factory that always serves the same [`FakePage`].
pub struct FakeBrowser {
    page: Arc<FakePage>,
    contexts_opened: AtomicUsize,
    contexts_closed: Arc<AtomicUsize>,
    last_options: Mutex<Option<ContextOptions>>,
}

impl FakeBrowser {
    pub fn new(page: Arc<FakePage>) -> Self {
        Self {
            page,
            contexts_opened: AtomicUsize::new(0),
            contexts_closed: Arc::new(AtomicUsize::new(0)),
            last_options: Mutex::new(None),
        }
    }

    pub fn page(&self) -> &Arc<FakePage> {
        &self.page
    }

    pub fn contexts_opened(&self) -> usize {
        self.contexts_opened.load(Ordering::SeqCst)
    }

    pub fn contexts_closed(&self) -> usize {
        self.contexts_closed.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent `new_context` call.
    pub fn last_options(&self) -> Option<ContextOptions> {
        self.last_options
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl ContextFactory for FakeBrowser {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserContext>> {
        self.contexts_opened.fetch_add(1, Ordering::SeqCst);
        *self
            .last_options
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(options.clone());
        Ok(Box::new(FakeContext {
            page: Arc::clone(&self.page),
            closed: Arc::clone(&self.contexts_closed),
        }))
    }
}

struct FakeContext {
    page: Arc<FakePage>,
    closed: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl BrowserContext for FakeContext {
    async fn new_page(&self) -> Result<Arc<dyn PageDriver>> {
        Ok(Arc::clone(&self.page) as Arc<dyn PageDriver>)
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Fake Shop</title></head><body>
        <input id="q" value="">
        <button id="go">Go</button>
        <div id="gone" style="display: none">hidden</div>
        <ul><li class="row"><a href="/1">one</a></li><li class="row"><a href="/2">two</a></li></ul>
        </body></html>"#;

    fn page() -> FakePage {
        FakePage::new()
            .with_route("https://shop.test/", PAGE)
            .with_route("https://shop.test/s?k=x", "<title>Results</title>")
            .navigate_on_click("#go", "https://shop.test/s?k=x")
    }

    #[tokio::test]
    async fn test_navigation_and_queries() {
        let page = page();
        page.goto("https://shop.test/", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(page.title().await.unwrap(), "Fake Shop");
        assert_eq!(page.count(".row").await.unwrap(), 2);
        assert!(page.outer_html(".row", 1).await.unwrap().contains("two"));
        assert!(page
            .wait_for_visible("#gone", Duration::from_millis(10))
            .await
            .unwrap_err()
            .is_timeout());
    }

    #[tokio::test]
    async fn test_click_navigates() {
        let page = page();
        page.goto("https://shop.test/", Duration::from_secs(1))
            .await
            .unwrap();
        page.fill("#q", "x").await.unwrap();
        assert_eq!(page.input_value("#q").await.unwrap(), "x");
        page.click("#go").await.unwrap();
        assert_eq!(page.current_url().await.unwrap(), "https://shop.test/s?k=x");
        assert_eq!(page.clicks(), vec!["#go".to_string()]);
    }

    #[tokio::test]
    async fn test_closed_page_refuses_work() {
        let page = page();
        page.close().await.unwrap();
        assert!(matches!(
            page.title().await,
            Err(BrowserError::SessionClosed(_))
        ));
        assert_eq!(page.close_calls(), 1);
    }
}
