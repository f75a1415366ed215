//! Browser automation engine for end-to-end storefront tests.
//!
//! Launches Chromium over the DevTools protocol, hands out isolated
//! browser contexts, and exposes each tab through the [`PageDriver`]
//! capability that page objects are built on.

pub mod actions;
pub mod context;
pub mod engine;
pub mod error;
pub mod executable;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod page;

pub use actions::PageDriver;
pub use context::{BrowserContext, ContextFactory, ContextOptions, SeedCookie};
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use page::CdpPage;
