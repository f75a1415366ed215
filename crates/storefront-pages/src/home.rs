use crate::base::{PageHelper, DEFAULT_TIMEOUT, PROBE_TIMEOUT};
use crate::error::PageResult;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use storefront_browser::PageDriver;
use storefront_core::SuiteConfig;

/// The search box can render well after the DOM is parsed.
const SEARCH_BOX_TIMEOUT: Duration = Duration::from_millis(15_000);
const SEARCH_NAVIGATION_TIMEOUT: Duration = Duration::from_millis(10_000);
const GUEST_GREETING: &str = "Hello, sign in";

fn search_results_url() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/s\?k=").expect("valid regex"))
}

/// The storefront landing page.
#[derive(Clone)]
pub struct HomePage {
    helper: PageHelper,
    base_url: String,
}

impl HomePage {
    pub const SEARCH_BOX: &'static str = "#twotabsearchtextbox";
    pub const SEARCH_BUTTON: &'static str = "#nav-search-submit-button";
    pub const CART_COUNT: &'static str = "#nav-cart-count";
    pub const ACCOUNT_MENU: &'static str = "#nav-link-accountList";
    pub const LOGO: &'static str = "#nav-logo";
    /// Any of the markups the navigation cart link has shipped with.
    pub const CART_LINK: &'static str =
        "#nav-cart, [aria-label*=\"cart\"], [data-csa-c-content-id=\"nav_cart\"]";

    pub fn new(driver: Arc<dyn PageDriver>, config: &SuiteConfig) -> Self {
        Self {
            helper: PageHelper::new(driver, config, "HomePage"),
            base_url: config.base_url().to_string(),
        }
    }

    pub fn helper(&self) -> &PageHelper {
        &self.helper
    }

    /// Navigate to the site root and wait for the search box.
    pub async fn open(&self) -> PageResult<&Self> {
        self.helper.navigate(&self.base_url).await?;
        self.helper
            .driver()
            .wait_for_visible(Self::SEARCH_BOX, SEARCH_BOX_TIMEOUT)
            .await?;
        Ok(self)
    }

    /// Submit a search and wait for the results URL.
    ///
    /// The URL change, not DOM readiness, is the signal that the search went
    /// through.
    pub async fn search_product(&self, term: &str) -> PageResult<()> {
        tracing::info!(parent: self.helper.span(), "Searching for product: {}", term);
        self.helper
            .wait_and_fill(Self::SEARCH_BOX, term, DEFAULT_TIMEOUT)
            .await?;
        self.helper
            .wait_and_click(Self::SEARCH_BUTTON, DEFAULT_TIMEOUT)
            .await?;
        self.helper
            .driver()
            .wait_for_url(search_results_url(), SEARCH_NAVIGATION_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Items in the cart, or 0 when the badge is missing or unreadable.
    ///
    /// Guest sessions frequently render no badge at all.
    pub async fn get_cart_count(&self) -> u32 {
        match self.helper.get_text(Self::CART_COUNT, PROBE_TIMEOUT).await {
            Ok(text) => parse_cart_count(&text).unwrap_or_else(|| {
                tracing::warn!(parent: self.helper.span(), "Cart badge text '{}' is not a count, returning 0", text);
                0
            }),
            Err(e) => {
                tracing::warn!(parent: self.helper.span(), "Could not get cart count, returning 0: {}", e);
                0
            }
        }
    }

    /// Whether the account menu greets a signed-in user.
    pub async fn is_logged_in(&self) -> PageResult<bool> {
        let account_text = self
            .helper
            .get_text(Self::ACCOUNT_MENU, DEFAULT_TIMEOUT)
            .await?;
        Ok(!account_text.starts_with(GUEST_GREETING))
    }

    pub async fn click_cart(&self) -> PageResult<()> {
        self.helper
            .wait_and_click(Self::CART_COUNT, DEFAULT_TIMEOUT)
            .await
    }

    /// Whether the navigation bar shows a cart link.
    pub async fn cart_link_visible(&self) -> bool {
        self.helper.is_visible(Self::CART_LINK, PROBE_TIMEOUT).await
    }

    pub async fn get_page_title(&self) -> PageResult<String> {
        self.helper.page_title().await
    }
}

/// Badge text as a count; anything but plain digits is `None`.
pub fn parse_cart_count(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
