use crate::model::{PartyRole, Slip, SlipValue};
use crate::views::TextTable;
use chrono::NaiveDate;

pub const SLIP_COLUMNS: [&str; 7] = ["CASH", "PARTY", "DUE", "UP TO", "M", "A/P", "AMT"];

/// Empty lines printed under the data rows for handwritten additions.
pub const BLANK_ROWS: usize = 6;

/// A slip laid out for printing.
#[derive(Debug, Clone)]
pub struct SlipDocument<'a> {
    slip: &'a Slip,
    role: PartyRole,
    today: NaiveDate,
}

impl<'a> SlipDocument<'a> {
    pub fn new(slip: &'a Slip, role: PartyRole, today: NaiveDate) -> Self {
        Self { slip, role, today }
    }

    /// `LENDER SLIP` or `BORROWER SLIP`.
    pub fn title(&self) -> String {
        format!("{} SLIP", self.role.to_string().to_uppercase())
    }

    /// `DD/MM/YY`.
    pub fn date(&self) -> String {
        self.today.format("%d/%m/%y").to_string()
    }

    /// The data rows followed by `BLANK_ROWS` empty rows.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        let text = |v: &Option<SlipValue>| v.as_ref().map(|v| v.to_string()).unwrap_or_default();
        let mut rows: Vec<Vec<String>> = self
            .slip
            .rows
            .iter()
            .map(|r| {
                let party = match r.party_status.trim() {
                    "" => r.party_name.to_uppercase(),
                    status => format!("{} ({status})", r.party_name.to_uppercase()),
                };
                vec![
                    text(&r.cash),
                    party,
                    text(&r.due),
                    text(&r.up_to),
                    text(&r.m),
                    text(&r.ap),
                    text(&r.amt),
                ]
            })
            .collect();
        rows.extend((0..BLANK_ROWS).map(|_| vec![String::new(); SLIP_COLUMNS.len()]));
        rows
    }

    pub fn table(&self) -> TextTable {
        let mut table = TextTable::new(SLIP_COLUMNS);
        for row in self.table_rows() {
            table.push_row(row);
        }
        let text = |v: &Option<SlipValue>| v.as_ref().map(|v| v.to_string()).unwrap_or_default();
        table.set_summary(vec![
            text(&self.slip.subtotal_cash),
            "A TOTAL".to_string(),
            self.date(),
            String::new(),
            String::new(),
            String::new(),
            text(&self.slip.subtotal_amt),
        ]);
        table
    }

    pub fn render(&self) -> String {
        let name = self.slip.name().to_uppercase();
        let mut out = vec![
            self.title(),
            format!("{name}    {}", self.date()),
            self.table().render(),
        ];
        if let Some(generated) = self.slip.generated_at.as_deref().filter(|g| !g.is_empty()) {
            out.push(format!("Generated on {generated}"));
        }
        out.join("\n")
    }
}
