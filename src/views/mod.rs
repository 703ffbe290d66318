//! Text renderings of the pages: list tables, the cashbook ledger and the printable slip.
//!
//! Views are pure: they take rows that were already loaded and produce text. Printing is left to
//! the commands.

mod cashbook;
mod companies;
mod customers;
mod slip;
mod transactions;

pub use cashbook::{
    check_page_size, CashbookColumn, CashbookPage, CashbookView, DEFAULT_PAGE_SIZE, PAGE_SIZES,
};
pub use companies::{company_table, CompanyColumn};
pub use customers::{customer_table, CustomerColumn};
pub use slip::{SlipDocument, BLANK_ROWS, SLIP_COLUMNS};
pub use transactions::{amount_label, transaction_detail, transaction_table, type_label, TransactionColumn};

use crate::Result;
use anyhow::Context;
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{Cell, CellAlignment, Table};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// How list output is written to stdout.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A boxed text table.
    #[default]
    Table,
    /// The rows as pretty-printed JSON.
    Json,
    /// The table as CSV.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Rendered output in the requested format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rendered {
    Json(serde_json::Value),
    Table(String),
    Csv(String),
}

impl Rendered {
    /// Renders `table`, or `data` when JSON was asked for.
    pub fn new<T: Serialize>(format: OutputFormat, table: &TextTable, data: &T) -> Result<Self> {
        Ok(match format {
            OutputFormat::Table => Rendered::Table(table.render()),
            OutputFormat::Csv => Rendered::Csv(table.to_csv()?),
            OutputFormat::Json => Rendered::Json(
                serde_json::to_value(data).context("Unable to serialize the rows")?,
            ),
        })
    }
}

impl Debug for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Json(v) => write!(f, "Rendered::Json({v:?})"),
            Rendered::Table(s) => write!(f, "Rendered::Table({} chars)", s.len()),
            Rendered::Csv(s) => write!(f, "Rendered::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => f.write_str(&s),
                Err(_) => write!(f, "{v:?}"),
            },
            Rendered::Table(s) | Rendered::Csv(s) => f.write_str(s),
        }
    }
}

/// A text table with an optional summary row and note lines underneath.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    summary: Option<Vec<String>>,
    right: Vec<usize>,
    notes: Vec<String>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Right-aligns the given columns (amounts).
    pub fn right_align(mut self, columns: &[usize]) -> Self {
        self.right = columns.to_vec();
        self
    }

    /// Rows shorter than the header are padded with empty cells.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(self.fit(row));
    }

    pub fn set_summary(&mut self, row: Vec<String>) {
        self.summary = Some(self.fit(row));
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn summary(&self) -> Option<&[String]> {
        self.summary.as_deref()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    fn fit(&self, mut row: Vec<String>) -> Vec<String> {
        row.resize(self.headers.len().max(row.len()), String::new());
        row
    }

    /// The table in markdown-style ASCII with the summary as its last row, followed by the notes.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(ASCII_MARKDOWN);
        if !self.headers.is_empty() {
            table.set_header(self.headers.iter().map(Cell::new));
        }
        for row in self.rows.iter().chain(self.summary.iter()) {
            table.add_row(row.iter().map(Cell::new));
        }
        for ix in &self.right {
            if let Some(column) = table.column_mut(*ix) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }
        let mut out = vec![table.to_string()];
        out.extend(self.notes.iter().cloned());
        out.join("\n")
    }

    /// The header, the rows and the summary row as CSV. Notes are left out.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in self.rows.iter().chain(self.summary.iter()) {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Unable to finish writing CSV: {e}"))?;
        String::from_utf8(bytes).context("CSV output was not valid UTF-8")
    }
}

impl Display for TextTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TextTable {
        let mut t = TextTable::new(["ID", "Name", "Amount"]).right_align(&[2]);
        t.push_row(vec!["1".into(), "Acme".into(), "₹1,000.00".into()]);
        t.push_row(vec!["22".into(), "Blue Hills, Ltd".into()]);
        t
    }

    fn line<'a>(rendered: &'a str, needle: &str) -> &'a str {
        rendered.lines().find(|l| l.contains(needle)).unwrap()
    }

    #[test]
    fn test_render_aligns_amounts() {
        let rendered = table().render();
        assert!(line(&rendered, "ID").contains("Amount"));
        assert_eq!(line(&rendered, "Acme"), "| 1  | Acme            | ₹1,000.00 |");
        assert_eq!(line(&rendered, "Blue Hills"), "| 22 | Blue Hills, Ltd |           |");
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_summary_and_notes() {
        let mut t = table();
        t.set_summary(vec!["".into(), "Total".into(), "₹1,000.00".into()]);
        t.push_note("Total 2 entries");
        let rendered = t.render();
        assert!(rendered.ends_with("|\nTotal 2 entries"));
        assert_eq!(line(&rendered, "Total "), "|    | Total           | ₹1,000.00 |");
        let last_row = rendered.lines().rev().nth(1).unwrap();
        assert!(last_row.contains("Total"));
    }

    #[test]
    fn test_render_without_rows() {
        let rendered = TextTable::new(["ID", "Name"]).render();
        assert!(rendered.lines().next().unwrap().contains("Name"));
        assert!(!rendered.contains("Acme"));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let csv = table().to_csv().unwrap();
        assert_eq!(
            csv,
            "ID,Name,Amount\n1,Acme,\"₹1,000.00\"\n22,\"Blue Hills, Ltd\",\n"
        );
    }

    #[test]
    fn test_output_format_text() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    }
}
