//! Data structures for input rows, harvested mail links, and per-row
//! processing outcomes.

/// Name of the column the enrichment result is written to.
pub const FOUND_EMAILS_COLUMN: &str = "Found Emails";

/// A single input record: `(column, value)` pairs in original column order,
/// tagged with the row's position in the input table.
///
/// Column order is preserved so the output table keeps the input layout,
/// and the index allows results collected out of order to be restored to
/// input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Zero-based position of the row in the input table.
    pub index: usize,
    fields: Vec<(String, String)>,
}

impl Row {
    /// Creates a row from `(column, value)` pairs.
    pub fn new(index: usize, fields: Vec<(String, String)>) -> Self {
        Self { index, fields }
    }

    /// Returns the value of `column`, if the column exists.
    ///
    /// Lookup is by exact column name; with duplicate headers the first
    /// occurrence wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `column` to `value`, appending the column if it is new.
    pub fn set(&mut self, column: &str, value: String) {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    /// Iterates over `(column, value)` pairs in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the trimmed value of the URL column, if present and non-blank.
    pub fn page_url(&self, url_column: &str) -> Option<&str> {
        self.get(url_column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// A short label for log lines: the first populated identity field,
    /// falling back to the row number.
    pub fn display_label(&self, identity_fields: &[String]) -> String {
        for field in identity_fields {
            if let Some(value) = self.get(field) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
        format!("row {}", self.index + 1)
    }
}

/// One harvested mail link: the decoded address and the anchor's visible
/// text (trimmed; empty if the anchor had no text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailtoEntry {
    pub email: String,
    pub text: String,
}

/// Outcome of enriching one row.
///
/// Kept as a tagged value through the batch so tests and callers can
/// distinguish "no matches" from "row failed"; flattened to the output
/// column string only when the table is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Zero or more matched addresses, in the order encountered on the page.
    Found(Vec<String>),
    /// The row could not be processed; the message is surfaced in the
    /// output column behind an `ERROR:` prefix.
    Failed(String),
}

impl RowOutcome {
    /// Renders the value written into the output column.
    pub fn output_value(&self) -> String {
        match self {
            RowOutcome::Found(emails) => emails.join(", "),
            RowOutcome::Failed(message) => format!("ERROR: {}", message),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RowOutcome::Failed(_))
    }

    /// The matched addresses, empty for failed rows.
    pub fn emails(&self) -> &[String] {
        match self {
            RowOutcome::Found(emails) => emails,
            RowOutcome::Failed(_) => &[],
        }
    }
}

/// A processed row paired with its outcome.
///
/// Constructors live next to the batch functions in `lib.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    pub row: Row,
    pub outcome: RowOutcome,
}

impl RowResult {
    /// Consumes the result, writing the outcome into the row's output column.
    pub fn into_annotated_row(mut self) -> Row {
        let value = self.outcome.output_value();
        self.row.set(FOUND_EMAILS_COLUMN, value);
        self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        Row::new(
            0,
            vec![
                ("Name".to_string(), "Jane Doe".to_string()),
                ("Staff Page URL".to_string(), "http://x/jane".to_string()),
            ],
        )
    }

    #[test]
    fn test_row_get_and_set_preserve_order() {
        let mut row = sample_row();
        assert_eq!(row.get("Name"), Some("Jane Doe"));
        assert_eq!(row.get("Missing"), None);

        row.set("Name", "Janet Doe".to_string());
        row.set(FOUND_EMAILS_COLUMN, "jane@x.com".to_string());

        let columns: Vec<&str> = row.fields().map(|(name, _)| name).collect();
        assert_eq!(columns, vec!["Name", "Staff Page URL", FOUND_EMAILS_COLUMN]);
        assert_eq!(row.get("Name"), Some("Janet Doe"));
    }

    #[test]
    fn test_page_url_trims_and_rejects_blank() {
        let mut row = sample_row();
        assert_eq!(row.page_url("Staff Page URL"), Some("http://x/jane"));

        row.set("Staff Page URL", "   ".to_string());
        assert_eq!(row.page_url("Staff Page URL"), None);
        assert_eq!(row.page_url("Other Column"), None);
    }

    #[test]
    fn test_display_label_prefers_first_populated_identity_field() {
        let row = Row::new(
            4,
            vec![
                ("Name".to_string(), "  ".to_string()),
                ("Title".to_string(), "Registrar".to_string()),
            ],
        );
        let fields = vec!["Name".to_string(), "Title".to_string()];
        assert_eq!(row.display_label(&fields), "Registrar");

        let empty = Row::new(4, vec![]);
        assert_eq!(empty.display_label(&fields), "row 5");
    }

    #[test]
    fn test_outcome_output_value() {
        let found = RowOutcome::Found(vec!["a@x.com".to_string(), "b@x.com".to_string()]);
        assert_eq!(found.output_value(), "a@x.com, b@x.com");

        let none = RowOutcome::Found(vec![]);
        assert_eq!(none.output_value(), "");

        let failed = RowOutcome::Failed("page timed out".to_string());
        assert_eq!(failed.output_value(), "ERROR: page timed out");
        assert!(failed.is_failed());
        assert!(failed.emails().is_empty());
    }

    #[test]
    fn test_into_annotated_row_sets_output_column() {
        let result = RowResult {
            row: sample_row(),
            outcome: RowOutcome::Found(vec!["jane@x.com".to_string()]),
        };
        let annotated = result.into_annotated_row();
        assert_eq!(annotated.get(FOUND_EMAILS_COLUMN), Some("jane@x.com"));
    }
}
