//! Filtering, sorting and paging of list rows.
//!
//! `TableState` holds what the user asked for; `TableState::apply` derives the visible rows from
//! it without touching the rows themselves, so the same state can be re-applied after a refetch.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The value of one cell, as used for filtering and sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Empty,
    Number(Decimal),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    /// The text that filters match against.
    pub fn text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => n.normalize().to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Empty cells sort first. Text compares without regard to case.
    fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Empty, _) => Ordering::Less,
            (_, CellValue::Empty) => Ordering::Greater,
            (CellValue::Number(a), CellValue::Number(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (a, b) => a.text().to_lowercase().cmp(&b.text().to_lowercase()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Number(Decimal::from(value))
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Number(value)
    }
}

impl From<Option<NaiveDate>> for CellValue {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(CellValue::Date).unwrap_or(CellValue::Empty)
    }
}

/// A row that can be shown in a table.
pub trait Row {
    type Column: Copy + Eq;

    fn cell(&self, column: Self::Column) -> CellValue;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<C> {
    /// The cell text contains `text`, ignoring case.
    Contains { column: C, text: String },
    /// The cell text equals one of `values`, ignoring case.
    OneOf { column: C, values: Vec<String> },
}

impl<C: Copy + Eq> Filter<C> {
    pub fn column(&self) -> C {
        match self {
            Filter::Contains { column, .. } | Filter::OneOf { column, .. } => *column,
        }
    }

    fn matches<R: Row<Column = C>>(&self, row: &R) -> bool {
        let text = row.cell(self.column()).text().to_lowercase();
        match self {
            Filter::Contains { text: needle, .. } => text.contains(&needle.trim().to_lowercase()),
            Filter::OneOf { values, .. } => values.iter().any(|v| v.trim().to_lowercase() == text),
        }
    }

    /// A filter with nothing to match on lets every row through, like a cleared search box.
    fn is_blank(&self) -> bool {
        match self {
            Filter::Contains { text, .. } => text.trim().is_empty(),
            Filter::OneOf { values, .. } => values.is_empty(),
        }
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

serde_plain::derive_display_from_serialize!(Direction);
serde_plain::derive_fromstr_from_deserialize!(Direction);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<C> {
    pub column: C,
    pub direction: Direction,
}

/// Filters, sort order and page for one table. Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState<C> {
    filters: Vec<Filter<C>>,
    sort: Option<Sort<C>>,
    page: usize,
    page_size: usize,
}

/// The rows of the current page and where that page sits.
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a, R> {
    pub rows: Vec<&'a R>,
    /// Rows left after filtering, across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

impl<C: Copy + Eq> TableState<C> {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: Vec::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> Option<Sort<C>> {
        self.sort
    }

    pub fn filters(&self) -> &[Filter<C>] {
        &self.filters
    }

    /// Replaces any filter on the same column and goes back to the first page.
    pub fn filter(mut self, filter: Filter<C>) -> Self {
        self.filters.retain(|f| f.column() != filter.column());
        if !filter.is_blank() {
            self.filters.push(filter);
        }
        self.page = 1;
        self
    }

    pub fn clear_filters(mut self) -> Self {
        self.filters.clear();
        self.page = 1;
        self
    }

    pub fn sort_by(mut self, column: C, direction: Direction) -> Self {
        self.sort = Some(Sort { column, direction });
        self
    }

    /// Sorts by `column` ascending, or flips the direction when already sorted by it.
    pub fn toggle_sort(self, column: C) -> Self {
        let direction = match self.sort {
            Some(s) if s.column == column && s.direction == Direction::Asc => Direction::Desc,
            _ => Direction::Asc,
        };
        self.sort_by(column, direction)
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Changing the page size goes back to the first page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self.page = 1;
        self
    }

    /// Filters, sorts and pages `rows`. A page past the end shows the last page.
    pub fn apply<'a, R>(&self, rows: &'a [R]) -> View<'a, R>
    where
        R: Row<Column = C>,
    {
        let mut kept: Vec<&R> = rows
            .iter()
            .filter(|row| self.filters.iter().all(|f| f.matches(*row)))
            .collect();

        if let Some(sort) = self.sort {
            // stable, so equal cells keep the server's order
            kept.sort_by(|a, b| {
                let ordering = a.cell(sort.column).compare(&b.cell(sort.column));
                match sort.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        let total = kept.len();
        let page_count = total.div_ceil(self.page_size).max(1);
        let page = self.page.min(page_count);
        let rows = kept
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();
        View {
            rows,
            total,
            page,
            page_count,
        }
    }
}
