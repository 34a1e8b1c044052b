//! Contains validation logic for the final Config struct.

use super::{Config, Result, ROW_DEADLINE_SLACK};
use crate::core::error::AppError;

/// Validates the configuration settings after loading and potential overrides.
/// Mutates the config to clamp values or set defaults where applicable and logical.
/// Internal helper for the builder's `build` method.
pub(crate) fn validate_config(config: &mut Config) -> Result<()> {
    if config.url_column.trim().is_empty() {
        return Err(AppError::Config(
            "URL column name cannot be blank.".to_string(),
        ));
    }

    config
        .identity_fields
        .retain(|field| !field.trim().is_empty());
    if config.identity_fields.is_empty() {
        tracing::warn!(
            "Identity field list is empty. Rows can only match via the single-mailto fallback."
        );
    }

    if config.navigation_timeout.is_zero() {
        return Err(AppError::Config(
            "Navigation timeout must be greater than zero.".to_string(),
        ));
    }
    if config.request_timeout.is_zero() {
        return Err(AppError::Config(
            "Request timeout must be greater than zero.".to_string(),
        ));
    }

    if config.settle_delay >= ROW_DEADLINE_SLACK {
        tracing::warn!(
            "Settle delay ({:?}) consumes the whole per-row slack ({:?}); browser rows may hit \
             the row deadline after a successful navigation.",
            config.settle_delay,
            ROW_DEADLINE_SLACK
        );
    }

    if config.max_concurrency == 0 {
        tracing::warn!("Max concurrency was set to 0. Setting to 1.");
        config.max_concurrency = 1;
    }

    if config.use_browser && config.webdriver_url.is_none() {
        return Err(AppError::Config(
            "WebDriver URL is required when browser navigation is enabled.".to_string(),
        ));
    }
    if !config.use_browser && config.webdriver_url.is_some() {
        tracing::warn!(
            "A WebDriver URL was provided, but browser navigation is disabled. The URL will be ignored."
        );
    }
    if !config.headless && !config.use_browser {
        tracing::warn!("Headful mode only applies to browser navigation. The flag will be ignored.");
    }
    if let Some(ref path) = config.chromedriver_path {
        if path.is_empty() {
            tracing::warn!("Provided ChromeDriver path is empty. It will be ignored.");
            config.chromedriver_path = None;
        }
    }
    Ok(())
}
