//! Error types shared across the library.

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors produced while loading input, navigating to staff pages, or
/// harvesting mailto links.
///
/// Per-row failures are contained by the row-processing layer and never
/// escape a batch; only configuration and initialization errors abort a run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("WebDriver session error: {0}")]
    WebDriverSession(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command error: {0}")]
    WebDriverCommand(#[from] fantoccini::error::CmdError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
