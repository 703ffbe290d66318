//! The cashbook ledger. Entries are computed by the server; the client only filters, pages and
//! sums them for display.

use crate::cache::QueryKey;
use crate::model::Amount;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// A receiving or deduction cell: an amount, or `-` when nothing moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    Amount(Amount),
    #[default]
    Blank,
}

impl Cell {
    /// The numeric value, counting a blank cell as zero.
    pub fn value(&self) -> Decimal {
        match self {
            Cell::Amount(a) => a.value(),
            Cell::Blank => Decimal::ZERO,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Amount(a) => Display::fmt(a, f),
            Cell::Blank => f.write_str("-"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cell::Amount(a) => a.serialize(serializer),
            Cell::Blank => serializer.serialize_str("-"),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Cell::Blank),
            Value::String(s) if s.trim() == "-" || s.trim().is_empty() => Ok(Cell::Blank),
            other => serde_json::from_value::<Amount>(other)
                .map(Cell::Amount)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbookEntry {
    pub id: u64,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub receiving: Cell,
    #[serde(default)]
    pub deduction: Cell,
    pub balance: Amount,
}

/// The `data` of a cashbook response. Servers send the entries either directly or wrapped in
/// another `data` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CashbookData {
    Flat(Vec<CashbookEntry>),
    Nested { data: Vec<CashbookEntry> },
}

impl Default for CashbookData {
    fn default() -> Self {
        CashbookData::Flat(Vec::new())
    }
}

impl CashbookData {
    pub fn into_entries(self) -> Vec<CashbookEntry> {
        match self {
            CashbookData::Flat(entries) | CashbookData::Nested { data: entries } => entries,
        }
    }
}

/// Cashbook filters. Values that are not set are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashbookParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl CashbookParams {
    /// The query string pairs for the request, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.company_id.filter(|id| *id != 0) {
            pairs.push(("companyId".to_string(), id.to_string()));
        }
        if let Some(d) = self.start_date {
            pairs.push(("startDate".to_string(), d.format("%Y-%m-%d").to_string()));
        }
        if let Some(d) = self.end_date {
            pairs.push(("endDate".to_string(), d.format("%Y-%m-%d").to_string()));
        }
        pairs
    }

    /// Each filter combination is cached on its own.
    pub fn cache_key(&self) -> QueryKey {
        self.query_pairs()
            .into_iter()
            .fold(QueryKey::new("cashbook"), |key, (k, v)| {
                key.with(format!("{k}={v}"))
            })
    }
}

/// Totals of one page of the cashbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub receiving: Amount,
    pub deduction: Amount,
    /// The balance of the last row on the page.
    pub balance: Amount,
}

impl PageSummary {
    /// Sums a page. An empty page has no summary.
    pub fn of(page: &[CashbookEntry]) -> Option<Self> {
        let last = page.last()?;
        Some(Self {
            receiving: Amount::new(page.iter().map(|e| e.receiving.value()).sum()),
            deduction: Amount::new(page.iter().map(|e| e.deduction.value()).sum()),
            balance: last.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn entries() -> Vec<CashbookEntry> {
        serde_json::from_value(json!([
            {"id": 1, "date": "2024-01-01", "description": "Loan", "reference": "TX-1",
             "receiving": "-", "deduction": 100000, "balance": -100000},
            {"id": 2, "date": "2024-02-01", "description": "Interest", "reference": "TX-1",
             "receiving": 2000.5, "deduction": "-", "balance": -97999.5},
            {"id": 3, "date": "2024-03-01", "description": "Interest", "reference": "TX-1",
             "receiving": "2000", "deduction": 500, "balance": -96499.5}
        ]))
        .unwrap()
    }

    #[test]
    fn test_blank_cells() {
        let e = entries();
        assert_eq!(e[0].receiving, Cell::Blank);
        assert_eq!(e[0].receiving.to_string(), "-");
        assert_eq!(e[0].deduction.to_string(), "₹1,00,000.00");
        assert_eq!(serde_json::to_value(e[1].deduction).unwrap(), json!("-"));
    }

    #[test]
    fn test_page_summary_treats_blank_as_zero() {
        let summary = PageSummary::of(&entries()).unwrap();
        assert_eq!(summary.receiving.value(), Decimal::from_str("4000.5").unwrap());
        assert_eq!(summary.deduction.value(), Decimal::from(100500));
        assert_eq!(summary.balance.value(), Decimal::from_str("-96499.5").unwrap());
        assert!(PageSummary::of(&[]).is_none());
    }

    #[test]
    fn test_both_response_shapes() {
        let row = json!({"id": 1, "date": "2024-01-01", "receiving": 5, "deduction": "-", "balance": 5});
        let flat: CashbookData = serde_json::from_value(json!([row.clone()])).unwrap();
        let nested: CashbookData = serde_json::from_value(json!({"data": [row]})).unwrap();
        assert_eq!(flat.into_entries(), nested.into_entries());
    }

    #[test]
    fn test_empty_params_are_not_sent() {
        assert!(CashbookParams::default().query_pairs().is_empty());
        let params = CashbookParams {
            company_id: Some(2),
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
        };
        assert_eq!(
            params.query_pairs(),
            vec![
                ("companyId".to_string(), "2".to_string()),
                ("endDate".to_string(), "2024-03-31".to_string())
            ]
        );
        assert_ne!(params.cache_key(), CashbookParams::default().cache_key());
        assert!(params.cache_key().starts_with(&QueryKey::new("cashbook")));
    }
}
