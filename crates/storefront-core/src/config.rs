//! Suite configuration loaded from environment variables.
//!
//! The configuration is read once at process entry and then passed by
//! reference to every component that needs it. Nothing deeper in the call
//! graph looks at the environment.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default site root under test.
pub const DEFAULT_BASE_URL: &str = "https://www.amazon.com";

/// Browser engines the suite can drive.
///
/// Only Chromium-class browsers speak the DevTools protocol the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chromium or Chromium-based build
    Chromium,
    /// Google Chrome
    Chrome,
}

impl FromStr for BrowserKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" => Ok(Self::Chromium),
            "chrome" => Ok(Self::Chrome),
            other => Err(ConfigError::invalid(
                "BROWSER",
                format!("unsupported browser '{other}' (expected chromium or chrome)"),
            )),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chromium => write!(f, "chromium"),
            Self::Chrome => write!(f, "chrome"),
        }
    }
}

/// Browser viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width
    pub width: u32,
    /// Viewport height
    pub height: u32,
}

/// Suite configuration.
///
/// Immutable after load. Construct with [`SuiteConfig::from_env`] at process
/// entry, or [`SuiteConfig::from_lookup`] in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SuiteConfig {
    /// Site root under test (`BASE_URL`)
    pub base_url: String,
    /// Run without a visible window (`HEADLESS`)
    pub headless: bool,
    /// Default operation timeout in milliseconds (`TIMEOUT`)
    pub timeout_ms: u64,
    /// Browser engine (`BROWSER`)
    pub browser: BrowserKind,
    /// Viewport width (`VIEWPORT_WIDTH`)
    pub viewport_width: u32,
    /// Viewport height (`VIEWPORT_HEIGHT`)
    pub viewport_height: u32,
    /// Capture a screenshot when a test fails (`SCREENSHOT_ON_FAILURE`)
    pub screenshot_on_failure: bool,
    /// Retry budget (`RETRY_COUNT`). Loaded but not consumed by any operation.
    pub retry_count: u32,
    /// Search term used by the scenarios (`TEST_PRODUCT`)
    pub test_product: String,
    /// Category used by the scenarios (`TEST_CATEGORY`)
    pub test_category: String,
    /// Running under CI (`CI`)
    pub ci: bool,
    /// Root of screenshot and log output (`REPORTS_DIR`)
    pub reports_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: false,
            timeout_ms: 30_000,
            browser: BrowserKind::Chromium,
            viewport_width: 1920,
            viewport_height: 1080,
            screenshot_on_failure: true,
            retry_count: 2,
            test_product: "laptop".to_string(),
            test_category: "Electronics".to_string(),
            ci: false,
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] if a numeric variable does not
    /// parse, `BROWSER` names an unsupported engine, or a value is out of
    /// range.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variable names.
    ///
    /// Unset variables take their documented defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            base_url: lookup("BASE_URL").unwrap_or(defaults.base_url),
            headless: lookup("HEADLESS").map_or(defaults.headless, |v| parse_bool(&v)),
            timeout_ms: parse_number(&lookup, "TIMEOUT", defaults.timeout_ms)?,
            browser: match lookup("BROWSER") {
                Some(v) => v.parse()?,
                None => defaults.browser,
            },
            viewport_width: parse_number(&lookup, "VIEWPORT_WIDTH", defaults.viewport_width)?,
            viewport_height: parse_number(&lookup, "VIEWPORT_HEIGHT", defaults.viewport_height)?,
            screenshot_on_failure: lookup("SCREENSHOT_ON_FAILURE")
                .map_or(defaults.screenshot_on_failure, |v| parse_bool(&v)),
            retry_count: parse_number(&lookup, "RETRY_COUNT", defaults.retry_count)?,
            test_product: lookup("TEST_PRODUCT").unwrap_or(defaults.test_product),
            test_category: lookup("TEST_CATEGORY").unwrap_or(defaults.test_category),
            ci: lookup("CI").map_or(defaults.ci, |v| parse_bool(&v)),
            reports_dir: lookup("REPORTS_DIR").map_or(defaults.reports_dir, PathBuf::from),
        };

        config.validate()?;
        tracing::debug!(
            base_url = %config.base_url,
            browser = %config.browser,
            headless = config.headless,
            "Loaded suite configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("TIMEOUT", "must be greater than zero"));
        }
        if self.viewport_width == 0 {
            return Err(ConfigError::invalid(
                "VIEWPORT_WIDTH",
                "must be greater than zero",
            ));
        }
        if self.viewport_height == 0 {
            return Err(ConfigError::invalid(
                "VIEWPORT_HEIGHT",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Viewport derived from the width and height settings.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }

    /// Whether the suite is running under CI.
    #[must_use]
    pub fn is_ci(&self) -> bool {
        self.ci
    }

    /// Directory screenshots are written to.
    #[must_use]
    pub fn screenshots_dir(&self) -> PathBuf {
        self.reports_dir.join("screenshots")
    }

    /// Directory log files are written to.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.reports_dir.join("logs")
    }

    /// Site root with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Report root as a borrowed path.
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }
}

/// Case-insensitive `"true"` check. Every other string is `false`.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(key, format!("'{raw}': {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ConfigResult<SuiteConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SuiteConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).expect("defaults load");
        assert_eq!(config.base_url, "https://www.amazon.com");
        assert!(!config.headless);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.browser, BrowserKind::Chromium);
        assert_eq!(
            config.viewport(),
            Viewport {
                width: 1920,
                height: 1080
            }
        );
        assert!(config.screenshot_on_failure);
        assert_eq!(config.retry_count, 2);
        assert_eq!(config.test_product, "laptop");
        assert_eq!(config.test_category, "Electronics");
        assert!(!config.is_ci());
    }

    #[test]
    fn test_bool_parsing_is_case_insensitive() {
        for value in ["true", "TRUE", "True", "tRuE"] {
            assert!(parse_bool(value), "{value} should parse as true");
        }
        for value in ["false", "FALSE", "False", "yes", "1", "", "on", " true", "true\n"] {
            assert!(!parse_bool(value), "{value} should parse as false");
        }
    }

    #[test]
    fn test_padded_bool_is_false() {
        let config = config_from(&[("HEADLESS", " true"), ("CI", "true ")]).expect("load");
        assert!(!config.headless);
        assert!(!config.is_ci());
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("BASE_URL", "https://shop.example.com"),
            ("HEADLESS", "TRUE"),
            ("TIMEOUT", "15000"),
            ("BROWSER", "Chrome"),
            ("VIEWPORT_WIDTH", "1366"),
            ("VIEWPORT_HEIGHT", "768"),
            ("SCREENSHOT_ON_FAILURE", "false"),
            ("RETRY_COUNT", "0"),
            ("TEST_PRODUCT", "headphones"),
            ("CI", "true"),
        ])
        .expect("overrides load");

        assert_eq!(config.base_url(), "https://shop.example.com");
        assert!(config.headless);
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.browser, BrowserKind::Chrome);
        assert_eq!(config.viewport().width, 1366);
        assert_eq!(config.viewport().height, 768);
        assert!(!config.screenshot_on_failure);
        assert_eq!(config.retry_count, 0);
        assert_eq!(config.test_product, "headphones");
        assert!(config.is_ci());
    }

    #[test]
    fn test_malformed_number_fails_fast() {
        let err = config_from(&[("TIMEOUT", "thirty")]).unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "TIMEOUT"),
            other => panic!("unexpected error: {other}"),
        }

        assert!(config_from(&[("VIEWPORT_WIDTH", "-5")]).is_err());
        assert!(config_from(&[("RETRY_COUNT", "2.5")]).is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(config_from(&[("TIMEOUT", "0")]).is_err());
        assert!(config_from(&[("VIEWPORT_HEIGHT", "0")]).is_err());
    }

    #[test]
    fn test_unsupported_browser() {
        let err = config_from(&[("BROWSER", "firefox")]).unwrap_err();
        assert!(err.to_string().contains("firefox"));
    }

    #[test]
    fn test_report_paths() {
        let config = config_from(&[("REPORTS_DIR", "/tmp/run-1")]).expect("load");
        assert_eq!(
            config.screenshots_dir(),
            PathBuf::from("/tmp/run-1/screenshots")
        );
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/run-1/logs"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = config_from(&[("BASE_URL", "https://shop.example.com/")]).expect("load");
        assert_eq!(config.base_url(), "https://shop.example.com");
    }
}
