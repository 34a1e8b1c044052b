//! Parsing and harvesting of `mailto:` anchors.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::core::models::MailtoEntry;

// Compiled once at startup. The unwrap is safe: the selector string is a
// compile-time constant with valid CSS syntax.
static MAILTO_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="mailto:"]"#).unwrap());

/// Extracts the address from a `mailto:` href.
///
/// Strips the scheme, drops any query component (`?subject=...`), and
/// percent-decodes the remainder. Decoding is best-effort: a value whose
/// escapes do not decode to valid UTF-8 is kept as-is rather than
/// rejected. Returns `None` when the href does not carry the `mailto:`
/// scheme (matching is case-sensitive, like the CSS attribute selector
/// used for harvesting).
pub(crate) fn parse_mailto_href(href: &str) -> Option<String> {
    let rest = href.trim().strip_prefix("mailto:")?;
    let address = rest.split('?').next().unwrap_or(rest);
    let decoded = match urlencoding::decode(address) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => address.to_string(),
    };
    Some(decoded)
}

/// Harvests every mailto anchor from a static HTML document, in document
/// order. Each anchor yields its parsed address and trimmed visible text.
pub(crate) fn extract_mailto_entries(html: &str) -> Vec<MailtoEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    for anchor in document.select(&MAILTO_SELECTOR) {
        let href = match anchor.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        if let Some(email) = parse_mailto_href(href) {
            let text = anchor.text().collect::<String>().trim().to_string();
            entries.push(MailtoEntry { email, text });
        }
    }
    tracing::trace!("Harvested {} mailto anchors", entries.len());
    entries
}
