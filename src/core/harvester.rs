use crate::browser;
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::matching::{extract_clues, resolve_matches};
use crate::core::models::{MailtoEntry, Row};
use crate::utils::mailto::extract_mailto_entries;
use crate::utils::urls::normalize_page_url;

use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// The main struct orchestrating per-row navigation, harvesting, and matching.
#[derive(Clone)]
pub struct EmailHarvester {
    http_client: Arc<Client>,
}

impl EmailHarvester {
    /// Creates a new EmailHarvester instance.
    ///
    /// In browser mode this also opens and closes a throwaway WebDriver
    /// session so a dead endpoint fails the run before any row is touched.
    pub(crate) async fn new(config: &Config) -> Result<Self> {
        tracing::debug!("Initializing EmailHarvester components...");
        let http_client = Arc::new(
            Client::builder()
                .user_agent(&config.user_agent)
                .timeout(config.navigation_timeout)
                .build()
                .map_err(|e| {
                    AppError::Initialization(format!("Failed to build HTTP client: {}", e))
                })?,
        );
        tracing::debug!("HTTP client initialized.");

        if config.use_browser {
            if let Some(ref webdriver_url) = config.webdriver_url {
                let probe = browser::create_client(config, webdriver_url).await?;
                browser::close_client(probe, "startup probe").await;
                tracing::debug!("WebDriver connectivity verified.");
            }
        }

        tracing::info!("EmailHarvester initialized successfully.");
        Ok(Self { http_client })
    }

    /// Finds email addresses for one row by visiting its staff page. (High Level)
    pub(crate) async fn find_emails(&self, config: &Config, row: &Row) -> Result<Vec<String>> {
        let task_label = format!(
            "row {} ({})",
            row.index + 1,
            row.display_label(&config.identity_fields)
        );
        tracing::info!(target: "enrich_task", "[{}] Starting staff page harvest", task_label);
        let start_time = Instant::now();

        let raw_url = row.page_url(&config.url_column).ok_or_else(|| {
            AppError::InsufficientInput(format!("Row has no value in '{}'", config.url_column))
        })?;
        let url = normalize_page_url(raw_url)?;

        let mailtos = self.harvest_page(config, url.as_str(), &task_label).await?;
        if mailtos.is_empty() {
            tracing::info!(target: "enrich_task", "[{}] No mailto links on page.", task_label);
        }

        let clues = extract_clues(row, &config.identity_fields);
        tracing::debug!(target: "enrich_task",
            "[{}] {} mailto entr(ies), {} clue token(s).",
            task_label, mailtos.len(), clues.len()
        );

        let emails = resolve_matches(&mailtos, &clues);

        let total_duration = start_time.elapsed();
        tracing::info!(target: "enrich_task",
            "[{}] Harvest finished in {:.2?}. Matched {} address(es).",
            task_label, total_duration, emails.len()
        );
        Ok(emails)
    }

    /// Fetches one page and harvests its mailto anchors, dispatching on the
    /// configured navigation mode.
    async fn harvest_page(
        &self,
        config: &Config,
        url: &str,
        label: &str,
    ) -> Result<Vec<MailtoEntry>> {
        if config.use_browser {
            browser::fetch_mailto_entries(config, url, label).await
        } else {
            self.fetch_static_mailto_entries(config, url, label).await
        }
    }

    /// Plain-HTTP navigation: fetch the document and parse the static HTML.
    async fn fetch_static_mailto_entries(
        &self,
        config: &Config,
        url: &str,
        label: &str,
    ) -> Result<Vec<MailtoEntry>> {
        tracing::debug!(target: "enrich_task", "[{}] GET {}", label, url);
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::NavigationTimeout(config.navigation_timeout)
            } else {
                AppError::Navigation(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Navigation(format!(
                "HTTP status {} for {}",
                status, url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Navigation(format!("Failed to read page body: {}", e)))?;
        Ok(extract_mailto_entries(&body))
    }
}
