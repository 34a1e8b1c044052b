//! # Email Harvester CLI
//!
//! Command-line interface for the Email Harvester library (`email_harvester_core`).
//! This binary parses arguments, sets up configuration, loads the staff table
//! (from a file or a URL), runs the enrichment batch, and writes the
//! annotated table back out as CSV.

use email_harvester_core::{
    initialize_harvester, process_rows, write_enriched_csv, Config, ConfigBuilder, EmailHarvester,
    RowResult, StaffTable,
};

// Dependencies specific to the CLI binary
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

mod service;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Enriches a staff table with email addresses harvested from each row's staff page.",
    long_about = "Email Harvester loads a CSV of staff records, visits each row's staff page, collects the page's mailto: links, and matches them against the row's name/title columns. Matched addresses land in a 'Found Emails' column in the output CSV."
)]
struct AppArgs {
    /// Path to the input CSV file containing staff rows.
    #[arg(short, long, env = "EMAIL_HARVESTER_INPUT")]
    input: Option<String>,

    /// URL to download the input CSV from (alternative to --input).
    #[arg(long, env = "EMAIL_HARVESTER_INPUT_URL")]
    input_url: Option<String>,

    /// Path to the output CSV file where enriched rows will be saved.
    #[arg(
        short,
        long,
        default_value = "results.csv",
        env = "EMAIL_HARVESTER_OUTPUT"
    )]
    output: String,

    /// Path to a configuration file (TOML format) to load settings from. CLI args override file settings.
    #[arg(long, env = "EMAIL_HARVESTER_CONFIG")]
    config_file: Option<String>,

    /// Name of the column holding each row's staff page URL.
    #[arg(long, env = "EMAIL_HARVESTER_URL_COLUMN")]
    url_column: Option<String>,

    /// Comma-separated list of columns mined for matching clues (names, titles, roles).
    #[arg(long, value_delimiter = ',', env = "EMAIL_HARVESTER_IDENTITY_FIELDS")]
    identity_fields: Option<Vec<String>>,

    /// Page navigation timeout in seconds.
    #[arg(long, env = "EMAIL_HARVESTER_TIMEOUT")]
    timeout: Option<u64>,

    /// Pause between navigation and harvesting, in milliseconds (browser mode).
    #[arg(long, env = "EMAIL_HARVESTER_SETTLE_MS")]
    settle_ms: Option<u64>,

    /// Maximum number of concurrent row tasks.
    #[arg(short, long, env = "EMAIL_HARVESTER_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Process at most this many rows (0 processes every row).
    #[arg(short, long, env = "EMAIL_HARVESTER_LIMIT")]
    limit: Option<usize>,

    /// Render pages in a real browser via WebDriver instead of plain HTTP fetches.
    #[arg(long, action = clap::ArgAction::SetTrue, env = "EMAIL_HARVESTER_BROWSER")]
    browser: Option<bool>,

    /// Run the browser with a visible window (browser mode only).
    #[arg(long, action = clap::ArgAction::SetTrue, env = "EMAIL_HARVESTER_HEADFUL")]
    headful: Option<bool>,

    /// URL of the running WebDriver instance (browser mode).
    #[arg(long, env = "EMAIL_HARVESTER_WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Path to ChromeDriver executable. If not specified, will try to detect automatically.
    #[arg(long, env = "EMAIL_HARVESTER_CHROMEDRIVER_PATH")]
    chromedriver_path: Option<String>,

    /// User agent string for page requests.
    #[arg(long, env = "EMAIL_HARVESTER_USER_AGENT")]
    user_agent: Option<String>,

    /// Timeout for downloading the input CSV, in seconds.
    #[arg(long, env = "EMAIL_HARVESTER_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Manage ChromeDriver service (start, stop, restart, status, logs)
    #[arg(long)]
    service: Option<String>,

    /// Number of log lines to show when using --service logs
    #[arg(long, default_value_t = 20)]
    log_lines: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting up tracing subscriber failed")?;

    tracing::info!(
        "Email Harvester CLI v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let args = AppArgs::parse();
    tracing::debug!("Parsed CLI arguments: {:?}", args);

    let mut config_builder = ConfigBuilder::new();

    if let Some(ref path) = args.config_file {
        config_builder = config_builder.config_file(path);
    }

    if let Some(ref column) = args.url_column {
        config_builder = config_builder.url_column(column);
    }
    if let Some(ref fields) = args.identity_fields {
        if !fields.is_empty() {
            config_builder = config_builder.identity_fields(fields.clone());
        }
    }
    if let Some(t) = args.timeout {
        config_builder = config_builder.navigation_timeout(Duration::from_secs(t));
    }
    if let Some(t) = args.request_timeout {
        config_builder = config_builder.request_timeout(Duration::from_secs(t));
    }
    if let Some(ms) = args.settle_ms {
        config_builder = config_builder.settle_delay(Duration::from_millis(ms));
    }
    if let Some(c) = args.concurrency {
        config_builder = config_builder.max_concurrency(c);
    }
    if let Some(n) = args.limit {
        config_builder = config_builder.limit(n);
    }
    if let Some(ref ua) = args.user_agent {
        config_builder = config_builder.user_agent(ua);
    }
    if args.browser == Some(true) {
        config_builder = config_builder.use_browser(true);
        if args.webdriver_url.is_none() {
            config_builder = config_builder.webdriver_url(Some("http://localhost:4444"));
            tracing::info!("Using default WebDriver URL: http://localhost:4444");
        }
    }
    if args.headful == Some(true) {
        config_builder = config_builder.headless(false);
    }
    if let Some(ref url) = args.webdriver_url {
        config_builder = config_builder.webdriver_url(Some(url));
    }
    if let Some(ref path) = args.chromedriver_path {
        config_builder = config_builder.chromedriver_path(Some(path));
    }

    let config = match config_builder.build() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Err(anyhow::anyhow!("Failed to build configuration: {}", e));
        }
    };
    tracing::debug!("Effective configuration loaded: {:?}", *config);

    if let Some(service_cmd) = args.service.as_deref() {
        return handle_service_command(service_cmd, args.log_lines, &config).await;
    }

    if config.use_browser {
        if let Err(e) = ensure_chromedriver_running(&config).await {
            tracing::warn!("ChromeDriver service issue: {}", e);
            if args.webdriver_url.is_none() {
                tracing::warn!("Browser mode may not work until a WebDriver endpoint is reachable");
            }
        }
    }

    let harvester = match initialize_harvester(&config).await {
        Ok(h) => Arc::new(h),
        Err(e) => {
            tracing::error!("Initialization error: {}", e);
            return Err(anyhow::anyhow!(
                "Failed to initialize EmailHarvester core: {}",
                e
            ));
        }
    };

    let start_time = Instant::now();

    if let Err(e) = process_file_mode(config.clone(), harvester, &args, start_time).await {
        tracing::error!("Execution failed: {}", e);
        return Err(e);
    }

    tracing::info!(
        "Processing finished successfully. Total duration: {:.2?}",
        start_time.elapsed()
    );

    if config.use_browser {
        if let Ok(running) = service::chromedriver::status(&config).await {
            if running {
                tracing::info!("ChromeDriver service is still running. You can stop it with: email-harvester --service stop");
            }
        }
    }

    Ok(())
}

/// Ensures the ChromeDriver service is running for browser mode
async fn ensure_chromedriver_running(config: &Config) -> Result<()> {
    if let Ok(running) = service::chromedriver::status(config).await {
        if running {
            tracing::info!("ChromeDriver service is already running");
            return Ok(());
        }
    }

    tracing::info!("Starting ChromeDriver service for browser-mode navigation...");
    service::chromedriver::start(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start ChromeDriver: {}", e))
}

/// Handles service management commands
async fn handle_service_command(command: &str, log_lines: usize, config: &Config) -> Result<()> {
    match command {
        "start" => {
            service::chromedriver::start(config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to start ChromeDriver service: {}", e))?;
            println!("ChromeDriver service started successfully");
        }
        "stop" => {
            service::chromedriver::stop(config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to stop ChromeDriver service: {}", e))?;
            println!("ChromeDriver service stopped successfully");
        }
        "restart" => {
            service::chromedriver::restart(config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to restart ChromeDriver service: {}", e))?;
            println!("ChromeDriver service restarted successfully");
        }
        "status" => {
            let running = service::chromedriver::status(config).await.map_err(|e| {
                anyhow::anyhow!("Failed to check ChromeDriver service status: {}", e)
            })?;

            if running {
                println!("ChromeDriver service is running and responsive");
            } else {
                println!("ChromeDriver service is not running or not responsive");
                return Err(anyhow::anyhow!(
                    "ChromeDriver service is not running or not responsive"
                ));
            }
        }
        "logs" => {
            let logs = service::chromedriver::logs(log_lines)
                .map_err(|e| anyhow::anyhow!("Failed to retrieve ChromeDriver logs: {}", e))?;

            println!("ChromeDriver Logs (last {} lines):", log_lines);
            println!("----------------------------------------");
            println!("{}", logs);
            println!("----------------------------------------");
        }
        _ => {
            return Err(anyhow::anyhow!("Unknown service command: {}. Valid commands are: start, stop, restart, status, logs", command));
        }
    }

    Ok(())
}

async fn process_file_mode(
    config: Arc<Config>,
    harvester: Arc<EmailHarvester>,
    args: &AppArgs,
    start_time: Instant,
) -> Result<()> {
    tracing::info!(
        "Running in {} navigation mode. Output: '{}'",
        if config.use_browser { "browser" } else { "HTTP" },
        args.output
    );
    let output_path = Path::new(&args.output);

    if let Some(parent_dir) = output_path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            tracing::debug!("Creating output directory: {}", parent_dir.display());
            std::fs::create_dir_all(parent_dir).with_context(|| {
                format!(
                    "Failed to create output directory '{}'",
                    parent_dir.display()
                )
            })?;
        }
    }
    File::create(&args.output).with_context(|| {
        format!(
            "Cannot write to output file '{}'. Check permissions.",
            args.output
        )
    })?;
    tracing::debug!("Output path '{}' seems writable.", args.output);

    let csv_text = load_csv_source(&config, args).await?;

    let table =
        StaffTable::parse(&csv_text).map_err(|e| anyhow::anyhow!("Failed to parse input CSV: {}", e))?;
    let total_rows_loaded = table.len();
    let headers: Vec<String> = table.headers().to_vec();

    let (rows, dropped_rows) = table.into_processable_rows(&config.url_column);
    if rows.is_empty() {
        tracing::warn!(
            "Input contains no rows with a value in the '{}' column. Saving empty results file.",
            config.url_column
        );
        save_results(&headers, &[], &args.output)?;
        return Ok(());
    }
    tracing::info!(
        "Loaded {} rows from input ({} with a staff page URL).",
        total_rows_loaded,
        rows.len()
    );

    let effective_rows = if config.limit > 0 {
        rows.len().min(config.limit)
    } else {
        rows.len()
    };
    tracing::info!(
        "Starting email harvest for {} rows (Concurrency: {})...",
        effective_rows,
        config.max_concurrency
    );
    let pb = ProgressBar::new(effective_rows as u64);
    pb.set_style(ProgressStyle::default_bar()
         .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta} | {msg}")
         .context("Failed to set progress bar template")?
         .progress_chars("=> "));
    pb.set_message("Processing rows...");

    let results = process_rows(config.clone(), harvester, rows).await;

    pb.set_position(results.len() as u64); // Ensure bar shows full completion
    pb.finish_with_message(format!("Processed {} rows", results.len()));

    tracing::info!("Saving results to '{}'...", args.output);
    save_results(&headers, &results, &args.output)?;
    tracing::info!("Results saved successfully.");

    log_summary(&results, total_rows_loaded, dropped_rows, start_time.elapsed());

    Ok(())
}

/// Reads the input CSV from a local file or downloads it from a URL.
async fn load_csv_source(config: &Config, args: &AppArgs) -> Result<String> {
    if let Some(ref path) = args.input {
        tracing::info!("Loading staff table from file '{}'...", path);
        let input_path = Path::new(path);
        if !input_path.exists() || !input_path.is_file() {
            return Err(anyhow::anyhow!(
                "Input file not found or is not a file: {}",
                path
            ));
        }
        return std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input file '{}'", path));
    }

    if let Some(ref url) = args.input_url {
        tracing::info!("Downloading staff table from '{}'...", url);
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client for the CSV download")?;
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download CSV from '{}'", url))?
            .error_for_status()
            .with_context(|| format!("CSV download from '{}' returned an error status", url))?;
        return response
            .text()
            .await
            .with_context(|| format!("Failed to read CSV body from '{}'", url));
    }

    Err(anyhow::anyhow!(
        "No CSV source specified. Provide --input or --input-url."
    ))
}

/// Saves the enriched rows to the specified CSV file, keeping the input
/// column order and per-row outcomes in the `Found Emails` column.
fn save_results(headers: &[String], results: &[RowResult], file_path: &str) -> Result<()> {
    tracing::debug!("Creating output file: {}", file_path);
    let file = File::create(file_path)
        .with_context(|| format!("Failed to create/truncate output file '{}'", file_path))?;
    let writer = BufWriter::new(file);

    tracing::debug!(
        "Writing {} enriched rows as CSV to file: {}",
        results.len(),
        file_path
    );
    let rows: Vec<_> = results
        .iter()
        .cloned()
        .map(RowResult::into_annotated_row)
        .collect();
    write_enriched_csv(writer, headers, &rows)
        .with_context(|| format!("Failed to write CSV results to '{}'", file_path))?;

    Ok(())
}

/// Logs a summary of the harvest to the console using `tracing::info`.
fn log_summary(
    results: &[RowResult],
    original_total: usize,
    skipped_rows: usize,
    duration: Duration,
) {
    let rows_processed = results.len();
    let failed_rows = results.iter().filter(|r| r.outcome.is_failed()).count();
    let rows_with_matches = results
        .iter()
        .filter(|r| !r.outcome.is_failed() && !r.outcome.emails().is_empty())
        .count();
    let rows_without_matches = rows_processed - failed_rows - rows_with_matches;
    let total_addresses: usize = results.iter().map(|r| r.outcome.emails().len()).sum();

    tracing::info!("-------------------- Harvest Summary --------------------");
    tracing::info!("Total Rows in Input Table  : {}", original_total);
    tracing::info!("Rows Skipped (No URL)      : {}", skipped_rows);
    tracing::info!("Rows Processed             : {}", rows_processed);
    tracing::info!("  - Rows With Emails Found : {}", rows_with_matches);
    tracing::info!("  - Rows With No Match     : {}", rows_without_matches);
    tracing::info!("  - Rows With Errors       : {}", failed_rows);
    tracing::info!("Email Addresses Harvested  : {}", total_addresses);
    tracing::info!("Total Time Taken           : {:.2?}", duration);
    if duration.as_secs_f64() > 0.01 && rows_processed > 0 {
        let rate = (rows_processed as f64) / duration.as_secs_f64();
        tracing::info!("Processing Rate            : {:.2} rows/sec", rate);
    }
    tracing::info!("---------------------------------------------------------");
}
