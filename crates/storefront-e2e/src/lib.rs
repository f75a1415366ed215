//! Storefront E2E - fixtures and scenarios for the storefront search flow.
//!
//! [`TestFixture`] gives every test its own isolated browser context and
//! page, screenshots failures and always tears both down. The scenarios
//! themselves live under `tests/` and need a local Chrome/Chromium.
//!
//! # Example
//!
//! ```rust,ignore
//! let fixture = TestFixture::from_env()?;
//! fixture
//!     .run("basic_search", |page| async move {
//!         let home = page.home();
//!         home.open().await?;
//!         home.search_product(&page.config().test_product).await?;
//!         assert!(page.search_results().has_results().await);
//!         Ok(())
//!     })
//!     .await?;
//! fixture.shutdown().await?;
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod fixture;

pub use error::{FixtureError, FixtureResult};
pub use fixture::{TestFixture, TestOutcome, TestPage};
