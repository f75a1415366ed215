//! Storefront Pages - page objects for the storefront search flow.
//!
//! Each page object pairs a set of named selectors with the semantic
//! operations built on them. They share one [`PageHelper`] for navigation,
//! waiting, clicking, filling and screenshots instead of inheriting from a
//! common base.
//!
//! # Example
//!
//! ```rust,ignore
//! let home = HomePage::new(Arc::clone(&driver), &config);
//! home.open().await?;
//! home.search_product(&config.test_product).await?;
//!
//! let results = SearchResultsPage::new(driver, &config);
//! assert!(results.has_results().await);
//! let products = results.get_products(5).await;
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod base;
pub mod error;
pub mod home;
pub mod product;
pub mod search_results;

pub use base::{PageHelper, DEFAULT_TIMEOUT, PROBE_TIMEOUT};
pub use error::{PageError, PageResult};
pub use home::HomePage;
pub use product::{extract_product, parse_price, parse_rating, parse_results_count, ProductRecord};
pub use search_results::SearchResultsPage;
