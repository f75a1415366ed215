use crate::actions::{cookie_domain, PageDriver};
use crate::error::Result;
use std::sync::Arc;
use storefront_core::{SuiteConfig, Viewport};

/// Desktop Chrome user agent presented by every test context.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A cookie planted in a context before its first page loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

impl SeedCookie {
    /// Cookie scoped to every subdomain of `site_url`, path `/`.
    pub fn for_site(site_url: &str, name: &str, value: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: cookie_domain(site_url)?,
            path: "/".to_string(),
        })
    }
}

/// Settings applied to a fresh, isolated browser context.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub viewport: Viewport,
    pub user_agent: String,
    pub ignore_https_errors: bool,
    pub cookies: Vec<SeedCookie>,
}

impl ContextOptions {
    /// Options for a test context: configured viewport, desktop user agent,
    /// TLS errors ignored, no seeded cookies.
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self {
            viewport: config.viewport(),
            user_agent: DESKTOP_USER_AGENT.to_string(),
            ignore_https_errors: true,
            cookies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: SeedCookie) -> Self {
        self.cookies.push(cookie);
        self
    }
}

/// An isolated browser context (separate cookies and storage) owning pages.
#[async_trait::async_trait]
pub trait BrowserContext: Send + Sync {
    /// Open a new page inside this context.
    async fn new_page(&self) -> Result<Arc<dyn PageDriver>>;

    /// Dispose of the context and everything in it.
    async fn close(&self) -> Result<()>;
}

/// Something that can hand out isolated contexts, usually a launched browser.
#[async_trait::async_trait]
pub trait ContextFactory: Send + Sync {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserContext>>;
}
