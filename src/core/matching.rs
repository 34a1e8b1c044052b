//! Clue extraction and mailto matching: the decision logic that picks
//! which harvested addresses belong to a row.

use std::collections::HashSet;

use crate::core::models::{MailtoEntry, Row};

/// Derives the set of lowercase clue tokens from a row's identity fields.
///
/// Each configured field present with a non-empty trimmed value is
/// lowercased and split on runs of whitespace and commas; the resulting
/// non-empty tokens are collected into a set (duplicates collapse).
/// Absent or blank fields contribute nothing.
pub(crate) fn extract_clues(row: &Row, identity_fields: &[String]) -> HashSet<String> {
    let mut clues = HashSet::new();
    for field in identity_fields {
        let value = match row.get(field) {
            Some(v) => v.trim(),
            None => continue,
        };
        if value.is_empty() {
            continue;
        }
        for token in value
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == ',')
        {
            if !token.is_empty() {
                clues.insert(token.to_string());
            }
        }
    }
    tracing::trace!("Extracted {} clue tokens", clues.len());
    clues
}

/// Selects the addresses for a row from the harvested mailto entries.
///
/// An entry matches when its lowercased text contains any clue token as a
/// substring (not whole-word). Matching entries contribute their email once
/// each, in the order the entries appeared on the page. With zero matches
/// and exactly one harvested entry overall, that single address is returned;
/// with zero matches and zero or several entries, the result is empty.
///
/// Entries are not deduplicated against each other: two entries carrying
/// the same address both contribute, and the duplicate is kept.
pub(crate) fn resolve_matches(mailtos: &[MailtoEntry], clues: &HashSet<String>) -> Vec<String> {
    let mut found = Vec::new();
    for entry in mailtos {
        let text = entry.text.to_lowercase();
        if clues.iter().any(|clue| text.contains(clue.as_str())) {
            found.push(entry.email.clone());
        }
    }

    if found.is_empty() && mailtos.len() == 1 {
        tracing::debug!(
            "No clue matched but page has a single mailto; using {}",
            mailtos[0].email
        );
        found.push(mailtos[0].email.clone());
    }

    found
}
