//! Shared HTML fixtures and builders for page-object tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use storefront_browser::fake::FakePage;
use storefront_core::SuiteConfig;

pub const BASE_URL: &str = "https://shop.test";
pub const HOME_URL: &str = "https://shop.test";
pub const RESULTS_URL: &str = "https://shop.test/s?k=laptop";
pub const RESULTS_PAGE_2_URL: &str = "https://shop.test/s?k=laptop&page=2";
pub const EMPTY_RESULTS_URL: &str = "https://shop.test/s?k=qwxzzplk";

pub const HOME_HTML: &str = r#"<!DOCTYPE html>
<html><head><title>Shop.test: Online Shopping</title></head>
<body>
  <a id="nav-logo" href="/">Shop</a>
  <a id="nav-link-accountList" href="/signin">Hello, sign in Account &amp; Lists</a>
  <a id="nav-cart" href="/cart" aria-label="3 items in cart"><span id="nav-cart-count">3</span></a>
  <form><input id="twotabsearchtextbox" type="text" value="">
  <input id="nav-search-submit-button" type="submit" value="Go"></form>
</body></html>"#;

pub const HOME_NO_BADGE_HTML: &str = r#"<!DOCTYPE html>
<html><head><title>Shop.test</title></head>
<body>
  <a id="nav-link-accountList" href="/account">Hello, Dana Account &amp; Lists</a>
  <input id="twotabsearchtextbox" type="text" value="">
  <input id="nav-search-submit-button" type="submit" value="Go">
</body></html>"#;

fn card(title: &str, price: &str, rating: &str, prime: bool, sponsored: bool) -> String {
    format!(
        r#"<div data-component-type="s-search-result">
  {sponsored}
  <h2><a href="/dp/{slug}"><span>{title}</span></a></h2>
  <span aria-label="{rating} out of 5 stars"></span>
  <span class="a-price"><span class="a-price-whole">{price}</span></span>
  {prime}
</div>"#,
        sponsored = if sponsored { "<span>Sponsored</span>" } else { "" },
        slug = title.replace(' ', "-"),
        prime = if prime {
            r#"<i class="a-icon-prime" aria-label="Amazon Prime"></i>"#
        } else {
            ""
        },
    )
}

pub fn results_html() -> String {
    let cards = [
        card("Acme Laptop 14", "$1,299.", "4.5", true, true),
        card("Zeta Notebook", "649.", "4.1", false, false),
        card("Budget Book", "$329.99", "3.9", true, false),
        card("Travel Laptop", "899.", "4.8", false, true),
        r#"<div data-component-type="s-search-result"><div class="placeholder"></div></div>"#
            .to_string(),
        card("Gaming Rig", "$2,149.", "4.6", true, false),
    ];
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Shop.test : laptop</title></head>
<body>
  <div data-component-type="s-result-info-bar"><span>1-48 of over 10,000 results for "laptop"</span></div>
  <select id="s-result-sort-select">
    <option value="relevanceblender">Featured</option>
    <option value="price-asc-rank">Price: Low to High</option>
  </select>
  {}
  <a class="s-pagination-next" href="/s?k=laptop&page=2">Next</a>
</body></html>"#,
        cards.join("\n")
    )
}

pub const LAST_RESULTS_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html><head><title>Shop.test : laptop</title></head>
<body>
  <div data-component-type="s-result-info-bar"><span>49-52 of 52 results for "laptop"</span></div>
  <div data-component-type="s-search-result"><h2><a href="/dp/x"><span>Last One</span></a></h2></div>
  <span class="s-pagination-next s-pagination-disabled" style="display: none">Next</span>
</body></html>"#;

pub const EMPTY_RESULTS_HTML: &str = r#"<!DOCTYPE html>
<html><head><title>Shop.test : qwxzzplk</title></head>
<body>
  <div class="s-no-results-message">No results for qwxzzplk.</div>
</body></html>"#;

/// A site with home, results (two pages) and an empty results page, where the
/// search button leads to the laptop results.
pub fn shop() -> FakePage {
    FakePage::new()
        .with_route(HOME_URL, HOME_HTML)
        .with_route(RESULTS_URL, &results_html())
        .with_route(RESULTS_PAGE_2_URL, LAST_RESULTS_PAGE_HTML)
        .with_route(EMPTY_RESULTS_URL, EMPTY_RESULTS_HTML)
        .navigate_on_click("#nav-search-submit-button", RESULTS_URL)
        .navigate_on_click(".s-pagination-next", RESULTS_PAGE_2_URL)
}

pub fn config(reports_dir: &Path) -> SuiteConfig {
    SuiteConfig {
        base_url: BASE_URL.to_string(),
        reports_dir: reports_dir.to_path_buf(),
        ..SuiteConfig::default()
    }
}

pub fn driver(page: FakePage) -> (Arc<FakePage>, Arc<dyn storefront_browser::PageDriver>) {
    let page = Arc::new(page);
    let driver: Arc<dyn storefront_browser::PageDriver> = page.clone();
    (page, driver)
}
