use crate::base::{PageHelper, DEFAULT_TIMEOUT, PROBE_TIMEOUT};
use crate::error::{PageError, PageResult};
use crate::product::{extract_product, parse_results_count, ProductRecord};
use std::sync::Arc;
use storefront_browser::PageDriver;
use storefront_core::SuiteConfig;

/// The search results listing.
#[derive(Clone)]
pub struct SearchResultsPage {
    helper: PageHelper,
}

impl SearchResultsPage {
    pub const RESULTS_INFO: &'static str = "[data-component-type=\"s-result-info-bar\"]";
    pub const PRODUCT_CARDS: &'static str = "[data-component-type=\"s-search-result\"]";
    pub const PRODUCT_LINK: &'static str = "h2 a";
    pub const NO_RESULTS_MESSAGE: &'static str = ".s-no-results-message";
    pub const NEXT_PAGE: &'static str = ".s-pagination-next";
    pub const SORT_DROPDOWN: &'static str = "#s-result-sort-select";

    pub fn new(driver: Arc<dyn PageDriver>, config: &SuiteConfig) -> Self {
        Self {
            helper: PageHelper::new(driver, config, "SearchResultsPage"),
        }
    }

    pub fn helper(&self) -> &PageHelper {
        &self.helper
    }

    /// Total results announced in the banner, or 0 when it is missing or
    /// worded differently.
    pub async fn get_results_count(&self) -> u64 {
        let banner = match self
            .helper
            .get_text(Self::RESULTS_INFO, DEFAULT_TIMEOUT)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(parent: self.helper.span(), "Could not extract results count: {}", e);
                return 0;
            }
        };

        parse_results_count(&banner).unwrap_or_else(|| {
            tracing::warn!(parent: self.helper.span(), "Results banner not understood: '{}'", banner);
            0
        })
    }

    /// Whether the search produced results (no "no results" banner).
    pub async fn has_results(&self) -> bool {
        !self
            .helper
            .is_visible(Self::NO_RESULTS_MESSAGE, PROBE_TIMEOUT)
            .await
    }

    /// Extract up to `max_count` product cards in document order.
    ///
    /// A card that cannot be read is logged and skipped; the remaining cards
    /// keep their positions.
    pub async fn get_products(&self, max_count: usize) -> Vec<ProductRecord> {
        let driver = self.helper.driver();
        let available = match driver.count(Self::PRODUCT_CARDS).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(parent: self.helper.span(), "Could not count product cards: {}", e);
                return Vec::new();
            }
        };

        let mut products = Vec::with_capacity(available.min(max_count));
        for position in 0..available.min(max_count) {
            let index = position + 1;
            match driver.outer_html(Self::PRODUCT_CARDS, position).await {
                Ok(html) => {
                    let product = extract_product(index, &html);
                    let preview: String = product
                        .title
                        .as_deref()
                        .unwrap_or("No title")
                        .chars()
                        .take(50)
                        .collect();
                    tracing::info!(parent: self.helper.span(), "Extracted product {}: {}...", index, preview);
                    products.push(product);
                }
                Err(e) => {
                    tracing::warn!(parent: self.helper.span(), "Failed to extract product {}: {}", index, e);
                }
            }
        }
        products
    }

    /// Open the product at 1-based `index`.
    pub async fn click_product(&self, index: usize) -> PageResult<()> {
        if index == 0 {
            return Err(PageError::InvalidIndex { index });
        }
        tracing::info!(parent: self.helper.span(), "Opening product {}", index);
        self.helper
            .driver()
            .click_within(Self::PRODUCT_CARDS, index - 1, Self::PRODUCT_LINK)
            .await?;
        self.helper.wait_for_page_load().await
    }

    /// Choose a sort order by its option value.
    pub async fn sort_by(&self, option: &str) -> PageResult<()> {
        tracing::info!(parent: self.helper.span(), "Sorting results by: {}", option);
        self.helper
            .driver()
            .select_option(Self::SORT_DROPDOWN, option)
            .await?;
        self.helper.wait_for_page_load().await
    }

    /// Follow the pagination "next" control. Returns `false` on the last page.
    pub async fn go_to_next_page(&self) -> PageResult<bool> {
        if !self.helper.is_visible(Self::NEXT_PAGE, PROBE_TIMEOUT).await {
            return Ok(false);
        }
        self.helper
            .wait_and_click(Self::NEXT_PAGE, DEFAULT_TIMEOUT)
            .await?;
        self.helper.wait_for_page_load().await?;
        Ok(true)
    }
}
