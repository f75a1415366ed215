use storefront_browser::BrowserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Screenshot could not be written: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid product index {index}: positions start at 1")]
    InvalidIndex { index: usize },
}

pub type PageResult<T> = std::result::Result<T, PageError>;
