use crate::actions::PageDriver;
use crate::context::{BrowserContext, ContextFactory, ContextOptions};
use crate::error::{BrowserError, Result};
use crate::executable::find_executable;
use crate::page::CdpPage;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetUserAgentOverrideParams};
use chromiumoxide::cdp::browser_protocol::security::SetIgnoreCertificateErrorsParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use futures_util::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront_core::SuiteConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Browser automation engine
///
/// Owns one Chromium process and the task pumping its CDP events. Tests get
/// isolated contexts from it through [`ContextFactory`].
pub struct BrowserEngine {
    browser: Arc<Mutex<Browser>>,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch Chromium configured from the suite settings.
    pub async fn launch(config: &SuiteConfig) -> Result<Self> {
        let viewport = config.viewport();
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .window_size(viewport.width, viewport.height)
            .request_timeout(Duration::from_millis(config.timeout_ms));

        if !config.headless {
            builder = builder.with_head();
        }

        match find_executable(config.browser) {
            Some(path) => {
                tracing::debug!("Using {} at {}", config.browser, path.display());
                builder = builder.chrome_executable(path);
            }
            None => {
                tracing::warn!(
                    "No {} executable found, falling back to auto-detection",
                    config.browser
                );
            }
        }

        let browser_config = builder.build().map_err(BrowserError::ChromiumError)?;

        tracing::info!(
            browser = %config.browser,
            headless = config.headless,
            "Launching browser"
        );

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event loop ended: {}", e);
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler,
        })
    }

    /// Whether the CDP event loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handler.is_finished()
    }

    /// Shut the browser process down.
    pub async fn close(self) -> Result<()> {
        {
            let mut browser = self.browser.lock().await;
            browser.close().await?;
            let _ = browser.wait().await;
        }
        self.handler.abort();
        tracing::info!("Browser closed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContextFactory for BrowserEngine {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserContext>> {
        let id = {
            let browser = self.browser.lock().await;
            browser
                .execute(CreateBrowserContextParams::default())
                .await?
                .result
                .browser_context_id
        };

        tracing::debug!("Created browser context {:?}", id);

        Ok(Box::new(CdpContext {
            browser: Arc::clone(&self.browser),
            id,
            options: options.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

/// An isolated CDP browser context.
pub struct CdpContext {
    browser: Arc<Mutex<Browser>>,
    id: BrowserContextId,
    options: ContextOptions,
    closed: AtomicBool,
}

impl CdpContext {
    async fn apply_options(&self, page: &chromiumoxide::Page) -> Result<()> {
        let viewport = &self.options.viewport;
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(BrowserError::ChromiumError)?;
        page.execute(metrics).await?;

        page.execute(SetUserAgentOverrideParams::new(
            self.options.user_agent.clone(),
        ))
        .await?;

        if self.options.ignore_https_errors {
            page.execute(SetIgnoreCertificateErrorsParams::new(true))
                .await?;
        }

        if !self.options.cookies.is_empty() {
            let cookies = self
                .options
                .cookies
                .iter()
                .map(|c| {
                    CookieParam::builder()
                        .name(c.name.clone())
                        .value(c.value.clone())
                        .domain(c.domain.clone())
                        .path(c.path.clone())
                        .build()
                        .map_err(BrowserError::ChromiumError)
                })
                .collect::<Result<Vec<_>>>()?;
            page.set_cookies(cookies).await?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl BrowserContext for CdpContext {
    async fn new_page(&self) -> Result<Arc<dyn PageDriver>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrowserError::SessionClosed(
                "context already disposed".to_string(),
            ));
        }

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.id.clone())
            .build()
            .map_err(BrowserError::ChromiumError)?;

        let page = {
            let browser = self.browser.lock().await;
            browser.new_page(params).await?
        };

        self.apply_options(&page).await?;
        tracing::info!("Created page in context {:?}", self.id);

        Ok(Arc::new(CdpPage::new(page)))
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let browser = self.browser.lock().await;
        browser
            .execute(DisposeBrowserContextParams::new(self.id.clone()))
            .await?;
        tracing::debug!("Disposed browser context {:?}", self.id);
        Ok(())
    }
}
