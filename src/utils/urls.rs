//! URL handling for staff-page targets.

use crate::core::error::{AppError, Result};
use url::Url;

/// Parses a row's page URL, defaulting the scheme to `https` when missing.
///
/// Returns `Err(AppError::InsufficientInput)` for blank input and
/// `Err(AppError::UrlParse)` when the value cannot be parsed or has no
/// host component.
pub(crate) fn normalize_page_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InsufficientInput(
            "Page URL is empty".to_string(),
        ));
    }

    let with_scheme = if !trimmed.contains("://") {
        format!("https://{}", trimmed)
    } else {
        trimmed.to_string()
    };

    let url = Url::parse(&with_scheme)?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => {
            tracing::warn!("Page URL '{}' has no host component", raw);
            Err(AppError::UrlParse(url::ParseError::EmptyHost))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_page_url_valid() {
        assert_eq!(
            normalize_page_url("https://x.com/staff/jane").unwrap().as_str(),
            "https://x.com/staff/jane"
        );
        assert_eq!(
            normalize_page_url("x.com/staff").unwrap().as_str(),
            "https://x.com/staff"
        );
        assert_eq!(
            normalize_page_url(" http://x.com ").unwrap().as_str(),
            "http://x.com/"
        );
    }

    #[test]
    fn test_normalize_page_url_invalid() {
        assert!(normalize_page_url("").is_err());
        assert!(normalize_page_url("   ").is_err());
        assert!(normalize_page_url("https://").is_err());
        assert!(normalize_page_url("http://").is_err());
    }
}
