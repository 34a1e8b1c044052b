//! Provides the `ConfigBuilder` for fluent configuration construction.

use super::loading::{apply_file_config, load_config_file};
use super::validation::validate_config;
use super::{Config, ConfigFile, Result};
use crate::AppError;
use std::path::Path;
use std::time::Duration;

/// Builder pattern for creating `Config` instances fluently.
///
/// This is the primary way to create a `Config`. It handles loading from
/// files, applying overrides, and validation.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    config_file_path: Option<String>,
    overrides: ConfigFile,
}

impl ConfigBuilder {
    /// Creates a new builder with default configuration values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify an optional configuration file path to load.
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file_path = Some(path.into());
        self
    }

    pub fn url_column(mut self, value: impl Into<String>) -> Self {
        self.overrides.input.url_column = Some(value.into());
        self
    }
    pub fn identity_fields(mut self, fields: Vec<String>) -> Self {
        self.overrides.input.identity_fields = Some(fields);
        self
    }
    pub fn navigation_timeout(mut self, duration: Duration) -> Self {
        self.overrides.network.navigation_timeout = Some(duration.as_secs());
        self
    }
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.overrides.network.request_timeout = Some(duration.as_secs());
        self
    }
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.overrides.network.user_agent = Some(value.into());
        self
    }
    pub fn settle_delay(mut self, duration: Duration) -> Self {
        self.overrides.browser.settle_delay_ms = Some(duration.as_millis() as u64);
        self
    }
    pub fn max_concurrency(mut self, value: usize) -> Self {
        self.overrides.processing.max_concurrency = Some(value);
        self
    }
    pub fn limit(mut self, value: usize) -> Self {
        self.overrides.processing.limit = Some(value);
        self
    }
    pub fn use_browser(mut self, enable: bool) -> Self {
        self.overrides.browser.enabled = Some(enable);
        self
    }
    pub fn headless(mut self, enable: bool) -> Self {
        self.overrides.browser.headless = Some(enable);
        self
    }
    pub fn webdriver_url(mut self, url: Option<impl Into<String>>) -> Self {
        self.overrides.browser.webdriver_url = url.map(|s| s.into());
        self
    }
    pub fn chromedriver_path(mut self, path: Option<impl Into<String>>) -> Self {
        self.overrides.browser.chromedriver_path = path.map(|s| s.into());
        self
    }

    /// Builds the final `Config` object, applying defaults, file settings,
    /// overrides, and validation.
    pub fn build(mut self) -> Result<Config> {
        let mut loaded_path: Option<String> = None;

        if let Some(ref path) = self.config_file_path {
            match load_config_file(path) {
                Ok(file_config) => {
                    apply_file_config(&mut self.config, &file_config);
                    loaded_path = Some(path.clone());
                    tracing::info!("Loaded base configuration from specified file: {}", path);
                }
                Err(e) => {
                    tracing::error!("Failed to load specified config file '{}': {}", path, e);
                    return Err(AppError::Config(format!(
                        "Failed to load specified configuration file '{}': {}",
                        path, e
                    )));
                }
            }
        } else {
            tracing::debug!("No config file specified, checking default locations.");
            for path_str in ["./email-harvester.toml", "./config.toml"] {
                if Path::new(path_str).exists() {
                    tracing::debug!("Found potential default config file: {}", path_str);
                    match load_config_file(path_str) {
                        Ok(file_config) => {
                            apply_file_config(&mut self.config, &file_config);
                            loaded_path = Some(path_str.to_string());
                            tracing::info!(
                                "Loaded base configuration from default location: {}",
                                path_str
                            );
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to load or parse default config '{}': {}",
                                path_str,
                                e
                            );
                        }
                    }
                }
            }
            if loaded_path.is_none() {
                tracing::info!("No configuration file found. Using default values and overrides.");
            }
        }

        apply_file_config(&mut self.config, &self.overrides);
        self.config.loaded_config_path = loaded_path;
        validate_config(&mut self.config)?;

        tracing::debug!("Final configuration built successfully.");
        Ok(self.config)
    }
}
