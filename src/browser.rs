//! WebDriver-based navigation for client-rendered staff pages.

use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::map::Map as JsonMap;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::MailtoEntry;
use crate::utils::mailto::parse_mailto_href;

const MAILTO_CSS: &str = r#"a[href^="mailto:"]"#;

/// Creates a WebDriver client connection with appropriate capabilities.
///
/// The browser runs headless unless the config disables it for debugging.
pub(crate) async fn create_client(config: &Config, webdriver_url: &str) -> Result<Client> {
    tracing::debug!(target: "browser", "Connecting to WebDriver at {}...", webdriver_url);

    let mut caps = JsonMap::new();
    let mut chrome_opts = JsonMap::new();

    let mut args = vec![
        "--no-sandbox",
        "--disable-gpu",
        "--disable-dev-shm-usage",
        "--window-size=1280,1024",
        "--disable-extensions",
        "--disable-background-networking",
        "--disable-sync",
        "--mute-audio",
        "--ignore-certificate-errors",
        "--log-level=1",
    ];
    if config.headless {
        args.push("--headless=new");
    }
    let user_agent_arg = format!("--user-agent={}", config.user_agent);
    args.push(user_agent_arg.as_str());
    chrome_opts.insert("args".to_string(), serde_json::json!(args));

    caps.insert("browserName".to_string(), serde_json::json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        serde_json::json!(chrome_opts),
    );

    tracing::trace!(target: "browser", "WebDriver capabilities: {:?}", caps);

    let mut builder = ClientBuilder::native();
    builder.capabilities(caps);

    match builder.connect(webdriver_url).await {
        Ok(client) => {
            tracing::debug!(target: "browser", "WebDriver client connected.");
            Ok(client)
        }
        Err(e) => {
            tracing::error!(target: "browser", "Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            Err(e.into())
        }
    }
}

/// Safely closes a client connection, logging any errors.
pub(crate) async fn close_client(client: Client, label: &str) {
    tracing::debug!(target: "browser", "[{}] Closing WebDriver session...", label);
    if let Err(e) = client.close().await {
        tracing::warn!(target: "browser", "[{}] Failed to close WebDriver session cleanly: {}", label, e);
    }
}

/// Navigates to `url` in a fresh WebDriver session and harvests mailto
/// anchors after the configured settle delay.
///
/// The session is closed before returning, on the error path included.
pub(crate) async fn fetch_mailto_entries(
    config: &Config,
    url: &str,
    label: &str,
) -> Result<Vec<MailtoEntry>> {
    let webdriver_url = config.webdriver_url.as_deref().ok_or_else(|| {
        AppError::Config(
            "WebDriver URL is required when browser navigation is enabled.".to_string(),
        )
    })?;

    let mut client = create_client(config, webdriver_url).await?;
    let result = navigate_and_harvest(&mut client, config, url, label).await;
    close_client(client, label).await;
    result
}

async fn navigate_and_harvest(
    client: &mut Client,
    config: &Config,
    url: &str,
    label: &str,
) -> Result<Vec<MailtoEntry>> {
    tracing::debug!(target: "browser", "[{}] Navigating to {}", label, url);
    match tokio::time::timeout(config.navigation_timeout, client.goto(url)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(AppError::Navigation(e.to_string())),
        Err(_) => return Err(AppError::NavigationTimeout(config.navigation_timeout)),
    }

    if !config.settle_delay.is_zero() {
        tracing::trace!(target: "browser", "[{}] Settling {:?} before harvest", label, config.settle_delay);
        tokio::time::sleep(config.settle_delay).await;
    }

    let anchors = client.find_all(Locator::Css(MAILTO_CSS)).await?;
    let mut entries = Vec::with_capacity(anchors.len());
    for mut anchor in anchors {
        let href = match anchor.attr("href").await? {
            Some(href) => href,
            None => continue,
        };
        if let Some(email) = parse_mailto_href(&href) {
            let text = anchor.text().await?.trim().to_string();
            entries.push(MailtoEntry { email, text });
        }
    }
    tracing::debug!(target: "browser", "[{}] Harvested {} mailto anchor(s)", label, entries.len());
    Ok(entries)
}
