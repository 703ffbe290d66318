use crate::model::{display_date, Party, Transaction};
use crate::table::{CellValue, Row};
use crate::views::TextTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransactionColumn {
    Id,
    Company,
    Lenders,
    Borrowers,
    Type,
    Date,
    Amount,
    Status,
}

serde_plain::derive_display_from_serialize!(TransactionColumn);
serde_plain::derive_fromstr_from_deserialize!(TransactionColumn);

impl Row for Transaction {
    type Column = TransactionColumn;

    fn cell(&self, column: TransactionColumn) -> CellValue {
        match column {
            TransactionColumn::Id => self.id.into(),
            TransactionColumn::Company => self.company_name().into(),
            TransactionColumn::Lenders => names(&self.lenders).into(),
            TransactionColumn::Borrowers => names(&self.borrowers).into(),
            TransactionColumn::Type => type_label(self).into(),
            TransactionColumn::Date => self.date().into(),
            TransactionColumn::Amount => self.amount_in_thousands.value().into(),
            // filters match the wire value, e.g. `advanced`
            TransactionColumn::Status => self.a_p_status.to_string().into(),
        }
    }
}

fn names(parties: &[Party]) -> String {
    let names: Vec<&str> = parties
        .iter()
        .map(|p| p.full_name.as_str())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

/// `S (Months: 1)`.
pub fn type_label(t: &Transaction) -> String {
    format!(
        "{} (Months: {})",
        t.transaction_type, t.transaction_number_type
    )
}

/// `₹100k`.
pub fn amount_label(t: &Transaction) -> String {
    format!("₹{}k", t.amount_in_thousands.grouped())
}

pub fn transaction_table(transactions: &[&Transaction]) -> TextTable {
    let mut table = TextTable::new([
        "ID", "Company", "Lenders", "Borrowers", "Type", "Date", "Amount", "Status",
    ])
    .right_align(&[6]);
    for t in transactions {
        table.push_row(vec![
            t.id.to_string(),
            t.company_name().to_string(),
            names(&t.lenders),
            names(&t.borrowers),
            type_label(t),
            display_date(&t.transaction_date),
            amount_label(t),
            t.a_p_status.label().to_string(),
        ]);
    }
    table
}

/// Every field of one transaction as `label: value` lines.
pub fn transaction_detail(t: &Transaction) -> String {
    let optional = |a: Option<crate::model::Amount>| {
        a.map(|a| a.grouped()).unwrap_or_else(|| "-".to_string())
    };
    let commissions: Vec<String> = t
        .comission_percentage
        .iter()
        .map(|c| format!("{}%", c.grouped()))
        .collect();
    let lines = [
        ("ID", t.id.to_string()),
        ("Company", t.company_name().to_string()),
        ("Type", type_label(t)),
        ("Date", display_date(&t.transaction_date)),
        ("Month", t.month.clone().unwrap_or_else(|| "-".to_string())),
        ("Amount", amount_label(t)),
        ("Status", t.a_p_status.label().to_string()),
        ("Lenders", names(&t.lenders)),
        ("Borrowers", names(&t.borrowers)),
        ("Interest received", optional(t.interest_recieved)),
        ("Interest paid", optional(t.interest_paid)),
        (
            "Commission",
            if commissions.is_empty() {
                "-".to_string()
            } else {
                commissions.join(", ")
            },
        ),
        ("Remarks", t.remarks.clone().unwrap_or_else(|| "-".to_string())),
    ];
    let width = lines.iter().map(|(l, _)| l.len()).max().unwrap_or_default();
    lines
        .iter()
        .map(|(label, value)| format!("{label:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Direction, Filter, TableState};
    use serde_json::json;

    fn transactions() -> Vec<Transaction> {
        serde_json::from_value(json!([
            {"id": 1, "company": {"id": 1, "companyName": "Acme Finance"},
             "transaction_type": "S", "transaction_number_type": 1,
             "transaction_date": "2024-01-10T00:00:00.000Z", "amount_in_thousands": 100,
             "a_p_status": "advanced",
             "lenders": [{"id": 1, "fullName": "Asha Verma"}],
             "borrowers": [{"id": 2, "fullName": "Ravi Kumar"}]},
            {"id": 2, "company": {"id": 2, "companyName": "Blue Hills Traders"},
             "transaction_type": "M", "transaction_number_type": 3,
             "transaction_date": "2024-02-15", "amount_in_thousands": "1250.5",
             "a_p_status": "past",
             "lenders": [{"id": 3, "fullName": "Meena Iyer"}],
             "borrowers": [{"id": 2, "fullName": "Ravi Kumar"}, {"id": 3, "fullName": "Meena Iyer"}]}
        ]))
        .unwrap()
    }

    #[test]
    fn test_list_columns() {
        let rows = transactions();
        let table = transaction_table(&rows.iter().collect::<Vec<_>>());
        assert_eq!(
            table.rows()[1],
            vec![
                "2",
                "Blue Hills Traders",
                "Meena Iyer",
                "Ravi Kumar, Meena Iyer",
                "M (Months: 3)",
                "15/02/2024",
                "₹1,250.5k",
                "Past"
            ]
        );
    }

    #[test]
    fn test_search_status_and_amount_sort() {
        let rows = transactions();
        let state = TableState::new(10).filter(Filter::Contains {
            column: TransactionColumn::Company,
            text: "acme".into(),
        });
        let view = state.apply(&rows);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, 1);

        let state = TableState::new(10)
            .filter(Filter::OneOf {
                column: TransactionColumn::Status,
                values: vec!["past".into()],
            })
            .sort_by(TransactionColumn::Amount, Direction::Desc);
        assert_eq!(state.apply(&rows).rows[0].id, 2);

        let by_date = TableState::new(10).sort_by(TransactionColumn::Date, Direction::Desc);
        assert_eq!(by_date.apply(&rows).rows[0].id, 2);
    }

    #[test]
    fn test_detail() {
        let rows = transactions();
        let detail = transaction_detail(&rows[0]);
        assert!(detail.contains("Amount             ₹100k"));
        assert!(detail.contains("Commission         -"));
    }
}
