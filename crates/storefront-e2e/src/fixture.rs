//! Per-test browser lifecycle.
//!
//! A [`TestFixture`] owns the browser for a group of tests. Each call to
//! [`TestFixture::run`] gets a fresh isolated context and page, and both are
//! torn down exactly once whether the body passes, returns an error or
//! panics.

use crate::error::FixtureResult;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use storefront_browser::{BrowserEngine, ContextFactory, ContextOptions, PageDriver};
use storefront_core::{logging, SuiteConfig};
use storefront_pages::{HomePage, PageHelper, SearchResultsPage};
use tokio::sync::OnceCell;
use tracing::Span;

/// How a test body finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(String),
}

impl TestOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn of<T, E: std::fmt::Display>(
        result: &std::result::Result<std::result::Result<T, E>, Box<dyn Any + Send>>,
    ) -> Self {
        match result {
            Ok(Ok(_)) => Self::Passed,
            Ok(Err(e)) => Self::Failed(e.to_string()),
            Err(payload) => Self::Failed(panic_message(payload.as_ref())),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "test panicked".to_string()
    }
}

/// The page handed to a test body.
#[derive(Clone)]
pub struct TestPage {
    driver: Arc<dyn PageDriver>,
    config: SuiteConfig,
}

impl TestPage {
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn home(&self) -> HomePage {
        HomePage::new(Arc::clone(&self.driver), &self.config)
    }

    pub fn search_results(&self) -> SearchResultsPage {
        SearchResultsPage::new(Arc::clone(&self.driver), &self.config)
    }
}

enum Launcher {
    /// Launch Chromium on first use.
    Chromium(OnceCell<BrowserEngine>),
    Provided(Arc<dyn ContextFactory>),
}

/// Browser, context and page lifecycle for a group of tests.
pub struct TestFixture {
    config: SuiteConfig,
    launcher: Launcher,
    span: Span,
}

impl TestFixture {
    /// Fixture that launches Chromium the first time a test runs.
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            launcher: Launcher::Chromium(OnceCell::new()),
            span: logging::component("TestFixture"),
        }
    }

    /// Fixture whose contexts come from `factory` instead of a launched browser.
    pub fn with_factory(config: SuiteConfig, factory: Arc<dyn ContextFactory>) -> Self {
        Self {
            config,
            launcher: Launcher::Provided(factory),
            span: logging::component("TestFixture"),
        }
    }

    /// Load configuration from the environment and install logging.
    pub fn from_env() -> FixtureResult<Self> {
        let config = SuiteConfig::from_env()?;
        let handle = logging::init(&config)?;
        tracing::info!("Logging to {}", handle.log_file().display());
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    async fn factory(&self) -> FixtureResult<&dyn ContextFactory> {
        match &self.launcher {
            Launcher::Chromium(cell) => {
                let engine = cell
                    .get_or_try_init(|| BrowserEngine::launch(&self.config))
                    .await?;
                Ok(engine as &dyn ContextFactory)
            }
            Launcher::Provided(factory) => Ok(factory.as_ref()),
        }
    }

    /// Run `body` against a fresh page in a fresh context.
    ///
    /// On failure (an error or a panic) a `<name>_failure` screenshot is saved
    /// when enabled. The page and then the context are closed afterwards no
    /// matter how the body ended, and a panic is resumed once teardown is
    /// done.
    pub async fn run<F, Fut, T>(&self, name: &str, body: F) -> FixtureResult<T>
    where
        F: FnOnce(TestPage) -> Fut,
        Fut: Future<Output = FixtureResult<T>>,
    {
        let factory = self.factory().await?;
        let options = ContextOptions::from_config(&self.config);
        let context = factory.new_context(&options).await?;

        let driver = match context.new_page().await {
            Ok(driver) => driver,
            Err(e) => {
                if let Err(close_err) = context.close().await {
                    tracing::warn!(parent: &self.span, "Failed to close context: {}", close_err);
                }
                return Err(e.into());
            }
        };
        tracing::info!(parent: &self.span, "Created new page for test: {}", name);

        let page = TestPage {
            driver: Arc::clone(&driver),
            config: self.config.clone(),
        };
        let result = AssertUnwindSafe(body(page)).catch_unwind().await;

        match TestOutcome::of(&result) {
            TestOutcome::Passed => {
                tracing::info!(parent: &self.span, "Test {} passed", name);
            }
            TestOutcome::Failed(reason) => {
                tracing::error!(parent: &self.span, "Test {} failed: {}", name, reason);
                if self.config.screenshot_on_failure {
                    let helper = PageHelper::new(Arc::clone(&driver), &self.config, "TestFixture");
                    match helper.take_screenshot(&format!("{name}_failure")).await {
                        Ok(path) => {
                            tracing::info!(parent: &self.span, "Failure screenshot: {}", path.display());
                        }
                        Err(e) => {
                            tracing::warn!(parent: &self.span, "Could not capture failure screenshot: {}", e);
                        }
                    }
                }
            }
        }

        if let Err(e) = driver.close().await {
            tracing::warn!(parent: &self.span, "Failed to close page: {}", e);
        }
        if let Err(e) = context.close().await {
            tracing::warn!(parent: &self.span, "Failed to close context: {}", e);
        }
        tracing::info!(parent: &self.span, "Closed page for test: {}", name);

        match result {
            Ok(outcome) => outcome,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }

    /// Close the browser if this fixture launched one.
    pub async fn shutdown(self) -> FixtureResult<()> {
        if let Launcher::Chromium(cell) = self.launcher {
            if let Some(engine) = cell.into_inner() {
                engine.close().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixtureError;
    use std::time::Duration;
    use storefront_browser::fake::{FakeBrowser, FakePage};
    use storefront_browser::BrowserError;
    use tempfile::TempDir;

    const HOME: &str = "https://shop.test";
    const HOME_HTML: &str = r#"<html><head><title>Shop</title></head><body>
        <input id="twotabsearchtextbox" value=""></body></html>"#;

    fn fixture(tmp: &TempDir, screenshots: bool) -> (TestFixture, Arc<FakeBrowser>) {
        let page = Arc::new(FakePage::new().with_route(HOME, HOME_HTML));
        let browser = Arc::new(FakeBrowser::new(page));
        let config = SuiteConfig {
            base_url: HOME.to_string(),
            screenshot_on_failure: screenshots,
            reports_dir: tmp.path().to_path_buf(),
            ..SuiteConfig::default()
        };
        let fixture = TestFixture::with_factory(config, Arc::clone(&browser) as Arc<dyn ContextFactory>);
        (fixture, browser)
    }

    fn screenshot_names(tmp: &TempDir) -> Vec<String> {
        std::fs::read_dir(tmp.path().join("screenshots"))
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_passing_body_tears_down_once() {
        let tmp = TempDir::new().unwrap();
        let (fixture, browser) = fixture(&tmp, true);

        let title = fixture
            .run("home_title", |page| async move {
                page.home().open().await?;
                Ok(page.driver().title().await?)
            })
            .await
            .unwrap();

        assert_eq!(title, "Shop");
        assert_eq!(browser.contexts_opened(), 1);
        assert_eq!(browser.contexts_closed(), 1);
        assert_eq!(browser.page().close_calls(), 1);
        assert!(screenshot_names(&tmp).is_empty());
    }

    #[tokio::test]
    async fn test_context_gets_configured_viewport() {
        let tmp = TempDir::new().unwrap();
        let (fixture, browser) = fixture(&tmp, false);

        fixture.run("noop", |_page| async { Ok(()) }).await.unwrap();

        let options = browser.last_options().expect("context was created");
        assert_eq!(options.viewport, fixture.config().viewport());
        assert!(options.ignore_https_errors);
    }

    #[tokio::test]
    async fn test_failing_body_screenshots_and_tears_down() {
        let tmp = TempDir::new().unwrap();
        let (fixture, browser) = fixture(&tmp, true);

        let err = fixture
            .run("missing_widget", |page| async move {
                page.driver().goto(HOME, Duration::from_secs(1)).await?;
                page.driver()
                    .wait_for_visible("#does-not-exist", Duration::from_millis(10))
                    .await?;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FixtureError::Browser(BrowserError::Timeout(_))));
        assert_eq!(browser.page().screenshot_count(), 1);
        let names = screenshot_names(&tmp);
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("missing_widget_failure_"));
        assert_eq!(browser.page().close_calls(), 1);
        assert_eq!(browser.contexts_closed(), 1);
    }

    #[tokio::test]
    async fn test_failure_without_screenshots_enabled() {
        let tmp = TempDir::new().unwrap();
        let (fixture, browser) = fixture(&tmp, false);

        let result: FixtureResult<()> = fixture
            .run("quiet_failure", |_page| async {
                Err(BrowserError::NavigationError("refused".to_string()).into())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(browser.page().screenshot_count(), 0);
        assert_eq!(browser.contexts_closed(), 1);
    }

    #[tokio::test]
    async fn test_panicking_body_is_resumed_after_teardown() {
        let tmp = TempDir::new().unwrap();
        let (fixture, browser) = fixture(&tmp, true);

        let caught = AssertUnwindSafe(fixture.run("panics", |page| async move {
            let rows = page.driver().count("li.row").await?;
            assert_eq!(rows, 3, "expected three rows");
            Ok(())
        }))
        .catch_unwind()
        .await;

        let payload = caught.expect_err("panic should propagate");
        assert!(panic_message(payload.as_ref()).contains("expected three rows"));
        assert_eq!(browser.page().close_calls(), 1);
        assert_eq!(browser.contexts_closed(), 1);
        assert_eq!(browser.page().screenshot_count(), 1);
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: std::result::Result<FixtureResult<()>, Box<dyn Any + Send>> = Ok(Ok(()));
        assert_eq!(TestOutcome::of(&ok), TestOutcome::Passed);

        let panicked: std::result::Result<FixtureResult<()>, Box<dyn Any + Send>> =
            Err(Box::new("boom"));
        assert_eq!(
            TestOutcome::of(&panicked),
            TestOutcome::Failed("boom".to_string())
        );
        assert!(TestOutcome::of(&panicked).is_failed());
    }
}
