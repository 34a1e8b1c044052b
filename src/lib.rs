//! # Email Harvester Core Library
//!
//! This crate provides the core logic for enriching a table of staff/contact
//! records with email addresses harvested from each record's staff page:
//! navigate to the page, collect its `mailto:` links, and match them against
//! the record's identity fields (name, title, role).
//!
//! It is designed to be used either directly as a library or via the
//! `email-harvester` command-line tool (which uses this library).

mod browser;
mod core;
mod utils;

pub use crate::core::config::{Config, ConfigBuilder, ConfigFile};
pub use crate::core::error::{AppError, Result};
pub use crate::core::harvester::EmailHarvester;
pub use crate::core::models::{MailtoEntry, Row, RowOutcome, RowResult, FOUND_EMAILS_COLUMN};
pub use crate::utils::table::{write_enriched_csv, StaffTable};

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

/// Initializes shared resources like the HTTP client and, in browser mode,
/// the WebDriver connectivity probe. Essential for creating an
/// `EmailHarvester` instance.
pub async fn initialize_harvester(config: &Config) -> Result<EmailHarvester> {
    EmailHarvester::new(config).await
}

/// Processes a single row: navigate, harvest, match, and package the outcome.
///
/// Every failure is contained here: navigation errors, timeouts, and
/// malformed pages all come back as a `RowResult` with a failed outcome,
/// never as an `Err`. One bad page must not abort a concurrent batch.
///
/// # Arguments
/// * `config` - The application configuration.
/// * `harvester` - An initialized `EmailHarvester` instance.
/// * `row` - The input row.
///
/// # Returns
/// * `RowResult` containing the row and its outcome.
pub async fn enrich_single_row(
    config: &Config,
    harvester: &EmailHarvester,
    row: Row,
) -> RowResult {
    let task_id = format!(
        "row {} ({})",
        row.index + 1,
        row.display_label(&config.identity_fields)
    );
    tracing::info!(target: "enrich_row", "[{}] Starting processing.", task_id);

    match harvester.find_emails(config, &row).await {
        Ok(emails) => {
            if emails.is_empty() {
                tracing::info!(target: "enrich_row", "[{}] No matching addresses.", task_id);
            } else {
                tracing::info!(target: "enrich_row",
                    "[{}] ✓ Found {} address(es): {}",
                    task_id, emails.len(), emails.join(", ")
                );
            }
            RowResult::found(row, emails)
        }
        Err(e) => {
            tracing::error!(target: "enrich_row", "[{}] !!! Error during harvest: {}", task_id, e);
            RowResult::failed(row, e.to_string())
        }
    }
}

/// Processes rows concurrently with bounded parallelism.
///
/// Applies the configured row `limit`, caps in-flight tasks at
/// `max_concurrency`, bounds each row by [`Config::row_deadline`], and
/// returns results restored to input order. Rows lacking a URL value are
/// dropped here as a backstop; the input loader normally filters them
/// before the batch starts.
///
/// # Arguments
/// * `config` - The application configuration.
/// * `harvester` - An Arc-wrapped, initialized `EmailHarvester` instance for sharing.
/// * `rows` - The input rows.
///
/// # Returns
/// * `Vec<RowResult>` with one entry per processed row, in input order.
pub async fn process_rows(
    config: Arc<Config>,
    harvester: Arc<EmailHarvester>,
    rows: Vec<Row>,
) -> Vec<RowResult> {
    let mut rows = rows;
    if config.limit > 0 && rows.len() > config.limit {
        tracing::info!(
            "Limiting this run to the first {} of {} rows.",
            config.limit,
            rows.len()
        );
        rows.truncate(config.limit);
    }

    let total_records = rows.len();
    if total_records == 0 {
        return Vec::new();
    }

    let mut tasks = FuturesUnordered::new();
    let mut results = Vec::with_capacity(total_records);

    for row in rows {
        if let Err(reason) = validate_row_input(&row, &config) {
            tracing::warn!("[row {}] Dropping row: {}.", row.index + 1, reason);
            continue;
        }

        while tasks.len() >= config.max_concurrency {
            if let Some(join_handle_result) = tasks.next().await {
                match join_handle_result {
                    Ok(row_result) => {
                        results.push(row_result);
                    }
                    Err(e) => {
                        tracing::error!("A row task failed to join: {}", e);
                    }
                }
            } else {
                tracing::warn!("Task queue unexpectedly empty while limiting concurrency.");
                break;
            }
        }

        let harvester_clone = Arc::clone(&harvester);
        let config_clone = Arc::clone(&config);

        tasks.push(tokio::spawn(async move {
            let deadline = config_clone.row_deadline();
            match tokio::time::timeout(
                deadline,
                enrich_single_row(&config_clone, &harvester_clone, row.clone()),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        "[row {}] Exceeded the {:?} row deadline; recording as failed.",
                        row.index + 1,
                        deadline
                    );
                    RowResult::failed(row, format!("row deadline of {:?} exceeded", deadline))
                }
            }
        }));
    }

    while let Some(join_handle_result) = tasks.next().await {
        match join_handle_result {
            Ok(row_result) => {
                results.push(row_result);
            }
            Err(e) => {
                tracing::error!("A row task failed to join during final drain: {}", e);
            }
        }
    }

    results.sort_by_key(|result| result.row.index);
    results
}

fn validate_row_input(row: &Row, config: &Config) -> std::result::Result<(), String> {
    if row.page_url(&config.url_column).is_none() {
        return Err(format!("no value in '{}' column", config.url_column));
    }
    Ok(())
}

impl RowResult {
    fn found(row: Row, emails: Vec<String>) -> Self {
        Self {
            row,
            outcome: RowOutcome::Found(emails),
        }
    }

    fn failed(row: Row, message: String) -> Self {
        Self {
            row,
            outcome: RowOutcome::Failed(message),
        }
    }
}
