//! Application configuration: runtime settings, fluent builder, TOML file
//! loading, and validation.

mod builder;
mod loading;
mod validation;

pub use builder::ConfigBuilder;

pub(crate) use crate::core::error::Result;

use serde::Deserialize;
use std::time::Duration;

/// Default name of the column holding each row's staff page URL.
pub(crate) const DEFAULT_URL_COLUMN: &str = "Staff Page URL";

/// Identity columns scanned for clue tokens when none are configured.
pub(crate) const DEFAULT_IDENTITY_FIELDS: [&str; 5] =
    ["Name", "First Name", "Contact", "Title", "Role"];

/// Slack added on top of the navigation timeout to bound one row's whole
/// pipeline (settle, harvest, matching included).
pub(crate) const ROW_DEADLINE_SLACK: Duration = Duration::from_secs(10);

/// Runtime configuration for an enrichment run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Column holding the staff page URL for each row.
    pub url_column: String,
    /// Columns scanned for clue tokens.
    pub identity_fields: Vec<String>,
    /// Timeout for navigating to a single staff page.
    pub navigation_timeout: Duration,
    /// Timeout for auxiliary HTTP requests (input CSV fetch, service probes).
    pub request_timeout: Duration,
    /// Pause between navigation and harvesting so client-rendered contact
    /// widgets can finish. Browser mode only; a plain HTTP fetch has no
    /// post-load rendering.
    pub settle_delay: Duration,
    /// User-Agent header sent with HTTP fetches.
    pub user_agent: String,
    /// Maximum number of rows processed simultaneously.
    pub max_concurrency: usize,
    /// Cap on processed rows; 0 processes every row.
    pub limit: usize,
    /// Navigate via a WebDriver browser session instead of plain HTTP.
    pub use_browser: bool,
    /// Run the browser headless; disable to watch navigation while debugging.
    pub headless: bool,
    /// WebDriver endpoint, required in browser mode.
    pub webdriver_url: Option<String>,
    /// Explicit chromedriver binary path for the service commands.
    pub chromedriver_path: Option<String>,
    /// Path of the TOML file settings were loaded from, if any.
    pub loaded_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_column: DEFAULT_URL_COLUMN.to_string(),
            identity_fields: DEFAULT_IDENTITY_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            navigation_timeout: Duration::from_secs(45),
            request_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(2000),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            max_concurrency: 5,
            limit: 0,
            use_browser: false,
            headless: true,
            webdriver_url: None,
            chromedriver_path: None,
            loaded_config_path: None,
        }
    }
}

impl Config {
    /// Outer deadline for one row's full pipeline: the navigation timeout
    /// plus [`ROW_DEADLINE_SLACK`].
    pub fn row_deadline(&self) -> Duration {
        self.navigation_timeout + ROW_DEADLINE_SLACK
    }
}

/// Root structure of the optional TOML configuration file.
///
/// Every field is optional; absent values leave the corresponding
/// [`Config`] value untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub processing: ProcessingSettings,
}

/// `[input]` section: table layout.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InputSettings {
    pub url_column: Option<String>,
    pub identity_fields: Option<Vec<String>>,
}

/// `[network]` section: timeouts in seconds plus the user agent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NetworkSettings {
    pub navigation_timeout: Option<u64>,
    pub request_timeout: Option<u64>,
    pub user_agent: Option<String>,
}

/// `[browser]` section: WebDriver navigation mode.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BrowserSettings {
    pub enabled: Option<bool>,
    pub headless: Option<bool>,
    pub settle_delay_ms: Option<u64>,
    pub webdriver_url: Option<String>,
    pub chromedriver_path: Option<String>,
}

/// `[processing]` section: batch behavior.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProcessingSettings {
    pub max_concurrency: Option<usize>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.url_column, "Staff Page URL");
        assert_eq!(
            config.identity_fields,
            vec!["Name", "First Name", "Contact", "Title", "Role"]
        );
        assert_eq!(config.navigation_timeout, Duration::from_secs(45));
        assert_eq!(config.settle_delay, Duration::from_millis(2000));
        assert_eq!(config.limit, 0);
        assert!(!config.use_browser);
        assert!(config.headless);
    }

    #[test]
    fn test_row_deadline_adds_slack() {
        let config = Config {
            navigation_timeout: Duration::from_secs(45),
            ..Config::default()
        };
        assert_eq!(config.row_deadline(), Duration::from_secs(55));
    }
}
