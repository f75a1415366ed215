use storefront_browser::BrowserError;
use storefront_core::ConfigError;
use storefront_pages::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),
}

pub type FixtureResult<T> = std::result::Result<T, FixtureError>;
