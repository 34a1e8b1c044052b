//! CSV parsing and serialization for the staff table.

use std::io::Write;

use crate::core::error::Result;
use crate::core::models::{Row, FOUND_EMAILS_COLUMN};

/// An in-memory staff table: the header row plus data rows in input order.
#[derive(Debug, Clone)]
pub struct StaffTable {
    headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl StaffTable {
    /// Parses CSV text with a header row into a table.
    ///
    /// Rows are tagged with their zero-based input position. Ragged records
    /// are tolerated: missing trailing cells read as empty strings and
    /// surplus cells are dropped.
    pub fn parse(csv_text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), record.get(i).unwrap_or("").to_string()))
                .collect();
            rows.push(Row::new(index, fields));
        }

        tracing::debug!(
            "Parsed {} data rows across {} columns",
            rows.len(),
            headers.len()
        );
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the table, keeping only rows whose URL column holds a
    /// non-blank value. Returns the surviving rows and the dropped count.
    pub fn into_processable_rows(self, url_column: &str) -> (Vec<Row>, usize) {
        let total = self.rows.len();
        let rows: Vec<Row> = self
            .rows
            .into_iter()
            .filter(|row| row.page_url(url_column).is_some())
            .collect();
        let dropped = total - rows.len();
        if dropped > 0 {
            tracing::info!(
                "Dropped {} row(s) with a blank '{}' column",
                dropped,
                url_column
            );
        }
        (rows, dropped)
    }
}

/// Serializes annotated rows back to CSV.
///
/// The output keeps the input column order and appends the `Found Emails`
/// column when the input did not already carry it. Cells are looked up by
/// column name per row, so any column a row never gained serializes as an
/// empty cell.
pub fn write_enriched_csv<W: Write>(writer: W, headers: &[String], rows: &[Row]) -> Result<()> {
    let mut output_columns: Vec<String> = headers.to_vec();
    if !output_columns.iter().any(|h| h == FOUND_EMAILS_COLUMN) {
        output_columns.push(FOUND_EMAILS_COLUMN.to_string());
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&output_columns)?;
    for row in rows {
        let record: Vec<&str> = output_columns
            .iter()
            .map(|column| row.get(column).unwrap_or(""))
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
