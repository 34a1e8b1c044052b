//! Handles loading configuration from files and applying it to the Config struct.

use super::{Config, ConfigFile};
use anyhow::Context;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Loads configuration settings from a TOML file.
/// Returns the parsed `ConfigFile` content.
/// Internal to the builder logic.
pub(crate) fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!(
            "File not found or is not a file: {}",
            file_path
        ));
    }
    tracing::debug!("Attempting to read config file: {}", file_path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    tracing::debug!("Attempting to parse TOML from: {}", file_path);
    let config_file_content: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::debug!("Successfully parsed configuration file: {}", file_path);
    Ok(config_file_content)
}

/// Applies settings from a parsed `ConfigFile` onto a mutable `Config`
/// instance. Internal helper for the builder. This merges settings.
pub(crate) fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    // Input
    if let Some(ref column) = file_config.input.url_column {
        if !column.trim().is_empty() {
            config.url_column = column.trim().to_string();
        }
    }
    if let Some(ref fields) = file_config.input.identity_fields {
        config.identity_fields = fields.clone();
    }

    // Network
    if let Some(timeout) = file_config.network.navigation_timeout {
        config.navigation_timeout = Duration::from_secs(timeout);
    }
    if let Some(timeout) = file_config.network.request_timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }
    if let Some(ref user_agent) = file_config.network.user_agent {
        config.user_agent = user_agent.clone();
    }

    // Browser
    if let Some(enabled) = file_config.browser.enabled {
        config.use_browser = enabled;
    }
    if let Some(headless) = file_config.browser.headless {
        config.headless = headless;
    }
    if let Some(delay_ms) = file_config.browser.settle_delay_ms {
        config.settle_delay = Duration::from_millis(delay_ms);
    }
    if let Some(ref url) = file_config.browser.webdriver_url {
        if !url.trim().is_empty() {
            config.webdriver_url = Some(url.trim().to_string());
        } else {
            config.webdriver_url = None;
        }
    }
    if let Some(ref path) = file_config.browser.chromedriver_path {
        if !path.trim().is_empty() {
            config.chromedriver_path = Some(path.trim().to_string());
        } else {
            config.chromedriver_path = None;
        }
    }

    // Processing
    if let Some(concurrency) = file_config.processing.max_concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(limit) = file_config.processing.limit {
        config.limit = limit;
    }
}
