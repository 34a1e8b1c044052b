//! Starts, stops, and inspects a local ChromeDriver process for browser-mode
//! navigation.
//!
//! The process is spawned detached so it survives individual harvester runs;
//! its PID and log live in the system temp directory so later invocations
//! (and `--service stop`) can find it again.

use anyhow::{anyhow, Context, Result};
use email_harvester_core::Config;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

const DEFAULT_PORT: u16 = 4444;
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(500);
const STARTUP_ATTEMPTS: u32 = 20;

fn pid_file() -> PathBuf {
    std::env::temp_dir().join("email-harvester-chromedriver.pid")
}

fn log_file() -> PathBuf {
    std::env::temp_dir().join("email-harvester-chromedriver.log")
}

/// Port ChromeDriver should listen on, taken from the configured WebDriver
/// URL when it carries one.
fn service_port(config: &Config) -> u16 {
    config
        .webdriver_url
        .as_deref()
        .and_then(|u| url::Url::parse(u).ok())
        .and_then(|u| u.port())
        .unwrap_or(DEFAULT_PORT)
}

fn status_endpoint(config: &Config) -> String {
    match config.webdriver_url.as_deref() {
        Some(base) => format!("{}/status", base.trim_end_matches('/')),
        None => format!("http://localhost:{}/status", DEFAULT_PORT),
    }
}

fn chromedriver_binary(config: &Config) -> String {
    config
        .chromedriver_path
        .clone()
        .unwrap_or_else(|| "chromedriver".to_string())
}

/// Spawns ChromeDriver and waits until its `/status` endpoint responds.
///
/// A no-op when an instance is already responsive on the configured endpoint.
pub async fn start(config: &Config) -> Result<()> {
    if status(config).await.unwrap_or(false) {
        tracing::info!("ChromeDriver is already running and responsive.");
        return Ok(());
    }

    let binary = chromedriver_binary(config);
    let port = service_port(config);
    let log_path = log_file();
    let log = fs::File::create(&log_path).with_context(|| {
        format!(
            "Failed to create ChromeDriver log file '{}'",
            log_path.display()
        )
    })?;
    let log_err = log
        .try_clone()
        .context("Failed to clone ChromeDriver log handle")?;

    tracing::info!("Starting ChromeDriver ('{}') on port {}...", binary, port);
    let child = Command::new(&binary)
        .arg(format!("--port={}", port))
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .spawn()
        .with_context(|| format!("Failed to spawn ChromeDriver binary '{}'", binary))?;

    fs::write(pid_file(), child.id().to_string())
        .context("Failed to record the ChromeDriver PID")?;

    for _ in 0..STARTUP_ATTEMPTS {
        tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
        if status(config).await.unwrap_or(false) {
            tracing::info!("ChromeDriver is up on port {}.", port);
            return Ok(());
        }
    }

    Err(anyhow!(
        "ChromeDriver did not become responsive on port {} within {:?}; see '{}'",
        port,
        STARTUP_POLL_INTERVAL * STARTUP_ATTEMPTS,
        log_path.display()
    ))
}

/// Stops the ChromeDriver process recorded in the PID file.
pub async fn stop(config: &Config) -> Result<()> {
    let pid_path = pid_file();
    let pid_text = match fs::read_to_string(&pid_path) {
        Ok(text) => text,
        Err(_) => {
            if status(config).await.unwrap_or(false) {
                return Err(anyhow!(
                    "ChromeDriver is responding but no PID file was found at '{}'; it was started outside this tool",
                    pid_path.display()
                ));
            }
            tracing::info!("ChromeDriver is not running.");
            return Ok(());
        }
    };
    let pid = pid_text.trim().to_string();

    tracing::info!("Stopping ChromeDriver (PID {})...", pid);
    let kill_result = if cfg!(windows) {
        Command::new("taskkill").args(["/PID", &pid, "/F"]).output()
    } else {
        Command::new("kill").arg(&pid).output()
    };

    match kill_result {
        Ok(output) if output.status.success() => {
            let _ = fs::remove_file(&pid_path);
            tracing::info!("ChromeDriver stopped.");
            Ok(())
        }
        Ok(output) => {
            if status(config).await.unwrap_or(false) {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(anyhow!(
                    "Failed to stop ChromeDriver (PID {}): {}",
                    pid,
                    stderr.trim()
                ))
            } else {
                // The recorded process is already gone; only the stale PID
                // file needed cleaning up.
                let _ = fs::remove_file(&pid_path);
                tracing::info!("ChromeDriver was not running; removed stale PID file.");
                Ok(())
            }
        }
        Err(e) => Err(anyhow!("Failed to run the process kill command: {}", e)),
    }
}

pub async fn restart(config: &Config) -> Result<()> {
    stop(config).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    start(config).await
}

/// Returns whether a WebDriver endpoint is responding on the configured URL.
pub async fn status(config: &Config) -> Result<bool> {
    let endpoint = status_endpoint(config);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .context("Failed to build the HTTP client for the status probe")?;

    match client.get(&endpoint).send().await {
        Ok(response) => Ok(response.status().is_success()),
        Err(_) => Ok(false),
    }
}

/// Returns the last `lines` lines of the ChromeDriver log.
pub fn logs(lines: usize) -> Result<String> {
    let log_path = log_file();
    let content = fs::read_to_string(&log_path).with_context(|| {
        format!(
            "No ChromeDriver log found at '{}'; has the service been started?",
            log_path.display()
        )
    })?;

    let all_lines: Vec<&str> = content.lines().collect();
    let start = all_lines.len().saturating_sub(lines);
    Ok(all_lines[start..].join("\n"))
}
