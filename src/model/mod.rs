//! Types that represent the data model served by the lending API, such as `Transaction` and
//! `CashbookEntry`.
mod amount;
mod cashbook;
mod company;
mod customer;
mod slip;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat};
pub use cashbook::{CashbookData, CashbookEntry, CashbookParams, Cell, PageSummary};
pub use company::{Company, CreateCompanyPayload};
pub use customer::{Customer, CustomerField, DocumentKind};
pub use slip::{PartyRole, Slip, SlipHeader, SlipRow, SlipValue};
pub use transaction::{ApStatus, Party, Transaction, TransactionPayload, TransactionType};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Renders a server timestamp or date as `DD/MM/YYYY`. Text that is not a date is returned as is.
pub fn display_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Reads the calendar date from `2024-01-01` or `2024-01-01T10:00:00.000Z`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Accepts a whole number sent either as a JSON number or as a numeric string.
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(u32),
        Text(String),
    }
    match Wire::deserialize(deserializer)? {
        Wire::Number(n) => Ok(n),
        Wire::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
