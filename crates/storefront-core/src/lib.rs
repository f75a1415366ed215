//! Storefront Core - shared foundation for the storefront E2E suite.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven suite configuration
//! - [`error`] - Configuration error types using thiserror
//! - [`logging`] - Console + file `tracing` setup and component spans
//! - [`artifacts`] - File naming for screenshots and logs
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_core::{logging, SuiteConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SuiteConfig::from_env()?;
//! let handle = logging::init(&config)?;
//! println!("logging to {}", handle.log_file().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod artifacts;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{BrowserKind, SuiteConfig, Viewport, DEFAULT_BASE_URL};
pub use error::{ConfigError, ConfigResult};
pub use logging::LogHandle;
