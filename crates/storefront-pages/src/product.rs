//! Product records and the parsing that turns result-card markup into them.
//!
//! Every field is extracted independently: a missing price never prevents
//! the title or rating from being read.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Title selectors tried in order. Only the first match of each is read, and
/// the first non-empty one wins.
pub const TITLE_SELECTORS: [&str; 4] = ["h2 span", "h2 a span", "h2", ".s-size-medium"];
pub const PRICE_SELECTOR: &str = ".a-price-whole";
pub const RATING_SELECTOR: &str = "[aria-label*=\"out of 5 stars\"]";
pub const PRIME_SELECTOR: &str = "[aria-label=\"Amazon Prime\"]";
pub const SPONSORED_MARKER: &str = "Sponsored";

/// One product card from a results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// 1-based position of the card in document order
    pub index: usize,
    pub title: Option<String>,
    pub price: Option<f64>,
    /// Star rating between 0 and 5
    pub rating: Option<f64>,
    pub is_prime: bool,
    pub is_sponsored: bool,
}

struct CardSelectors {
    titles: Vec<Selector>,
    price: Selector,
    rating: Selector,
    prime: Selector,
}

fn card_selectors() -> &'static CardSelectors {
    static SELECTORS: OnceLock<CardSelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| CardSelectors {
        titles: TITLE_SELECTORS
            .iter()
            .map(|s| Selector::parse(s).expect("valid title selector"))
            .collect(),
        price: Selector::parse(PRICE_SELECTOR).expect("valid price selector"),
        rating: Selector::parse(RATING_SELECTOR).expect("valid rating selector"),
        prime: Selector::parse(PRIME_SELECTOR).expect("valid prime selector"),
    })
}

/// Build a record from the outer HTML of one product card.
pub fn extract_product(index: usize, card_html: &str) -> ProductRecord {
    let selectors = card_selectors();
    let card = Html::parse_fragment(card_html);

    let title = selectors.titles.iter().find_map(|sel| {
        card.select(sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    });

    let price = card
        .select(&selectors.price)
        .next()
        .and_then(|el| parse_price(&el.text().collect::<String>()));

    let rating = card
        .select(&selectors.rating)
        .next()
        .and_then(|el| el.value().attr("aria-label"))
        .and_then(parse_rating);

    let is_prime = card.select(&selectors.prime).next().is_some();

    let is_sponsored = card
        .root_element()
        .text()
        .collect::<String>()
        .contains(SPONSORED_MARKER);

    ProductRecord {
        index,
        title,
        price,
        rating,
        is_prime,
        is_sponsored,
    }
}

/// Parse price text such as `"$1,299.00"`.
///
/// Everything except digits and the decimal point is dropped first. Text
/// with no digits, or with more than one decimal point, yields `None`.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a rating label of the form `"4.5 out of 5 stars"`.
pub fn parse_rating(label: &str) -> Option<f64> {
    static RATING: OnceLock<Regex> = OnceLock::new();
    let regex =
        RATING.get_or_init(|| Regex::new(r"([\d.]+) out of 5 stars").expect("valid regex"));

    regex
        .captures(label)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|rating| (0.0..=5.0).contains(rating))
}

/// Parse the total from a banner such as `"1-48 of over 10,000 results"`.
///
/// Returns `None` when the banner does not follow that wording.
pub fn parse_results_count(banner: &str) -> Option<u64> {
    static COUNT: OnceLock<Regex> = OnceLock::new();
    let regex = COUNT.get_or_init(|| {
        Regex::new(r"of\s+(?:over\s+)?([\d,]+)\s+results").expect("valid regex")
    });

    regex
        .captures(banner)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}
