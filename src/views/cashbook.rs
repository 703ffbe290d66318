use crate::model::{display_date, parse_date, CashbookEntry, CashbookParams, PageSummary};
use crate::table::{CellValue, Row, TableState};
use crate::views::TextTable;
use anyhow::bail;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 15;
pub const PAGE_SIZES: [usize; 5] = [10, 15, 25, 50, 100];

pub fn check_page_size(page_size: usize) -> crate::Result<()> {
    if !PAGE_SIZES.contains(&page_size) {
        bail!(
            "Rows per page must be one of {}",
            PAGE_SIZES.map(|n| n.to_string()).join(", ")
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashbookColumn {
    Date,
    Description,
    Reference,
    Receiving,
    Deduction,
    Balance,
}

impl Row for CashbookEntry {
    type Column = CashbookColumn;

    fn cell(&self, column: CashbookColumn) -> CellValue {
        match column {
            CashbookColumn::Date => parse_date(&self.date).into(),
            CashbookColumn::Description => self.description.as_str().into(),
            CashbookColumn::Reference => self.reference.as_str().into(),
            CashbookColumn::Receiving => self.receiving.value().into(),
            CashbookColumn::Deduction => self.deduction.value().into(),
            CashbookColumn::Balance => self.balance.value().into(),
        }
    }
}

/// One page of the ledger as written for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashbookPage {
    pub entries: Vec<CashbookEntry>,
    pub summary: Option<PageSummary>,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

/// The cashbook ledger, in server order, one page at a time.
#[derive(Debug, Clone)]
pub struct CashbookView<'a> {
    entries: &'a [CashbookEntry],
    params: CashbookParams,
    state: TableState<CashbookColumn>,
    print: bool,
}

impl<'a> CashbookView<'a> {
    /// Fails when `page_size` is not one of `PAGE_SIZES`.
    pub fn new(entries: &'a [CashbookEntry], page_size: usize) -> crate::Result<Self> {
        check_page_size(page_size)?;
        Ok(Self {
            entries,
            params: CashbookParams::default(),
            state: TableState::new(page_size),
            print: false,
        })
    }

    /// The filters the entries were loaded with, shown above the table.
    pub fn with_params(mut self, params: CashbookParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.state = self.state.with_page(page);
        self
    }

    /// Print mode renders the table and nothing else.
    pub fn print_mode(mut self, print: bool) -> Self {
        self.print = print;
        self
    }

    pub fn page(&self) -> CashbookPage {
        let view = self.state.apply(self.entries);
        let entries: Vec<CashbookEntry> = view.rows.into_iter().cloned().collect();
        CashbookPage {
            summary: PageSummary::of(&entries),
            entries,
            page: view.page,
            page_count: view.page_count,
            total: view.total,
        }
    }

    pub fn table(&self) -> TextTable {
        let page = self.page();
        let mut table = TextTable::new([
            "Date",
            "Description",
            "Reference",
            "Receiving",
            "Deduction",
            "Balance",
        ])
        .right_align(&[3, 4, 5]);
        for e in &page.entries {
            table.push_row(vec![
                display_date(&e.date),
                e.description.clone(),
                e.reference.clone(),
                e.receiving.to_string(),
                e.deduction.to_string(),
                e.balance.to_string(),
            ]);
        }
        if let Some(summary) = page.summary {
            table.set_summary(vec![
                String::new(),
                "Page total".to_string(),
                String::new(),
                summary.receiving.to_string(),
                summary.deduction.to_string(),
                summary.balance.to_string(),
            ]);
        }
        if !self.print {
            if page.entries.is_empty() {
                table.push_note("No cashbook entries found");
            }
            table.push_note(format!(
                "Page {} of {} | Rows per page: {} ({})",
                page.page,
                page.page_count,
                self.state.page_size(),
                PAGE_SIZES.map(|n| n.to_string()).join("/")
            ));
            table.push_note(format!("Total {} entries", page.total));
        }
        table
    }

    pub fn render(&self) -> String {
        let table = self.table().render();
        if self.print {
            return table;
        }
        format!("{}\n{table}", self.filter_line())
    }

    fn filter_line(&self) -> String {
        let p = &self.params;
        let text = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "any".to_string())
        };
        format!(
            "Company: {} | From: {} | To: {}",
            p.company_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "all".to_string()),
            text(p.start_date),
            text(p.end_date)
        )
    }
}
