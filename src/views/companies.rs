use crate::model::{display_date, parse_date, Company};
use crate::table::{CellValue, Row};
use crate::views::TextTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompanyColumn {
    Id,
    Name,
    Description,
    Created,
}

serde_plain::derive_display_from_serialize!(CompanyColumn);
serde_plain::derive_fromstr_from_deserialize!(CompanyColumn);

impl Row for Company {
    type Column = CompanyColumn;

    fn cell(&self, column: CompanyColumn) -> CellValue {
        match column {
            CompanyColumn::Id => self.id.into(),
            CompanyColumn::Name => self.company_name.as_str().into(),
            CompanyColumn::Description => self.company_desc.clone().unwrap_or_default().into(),
            CompanyColumn::Created => self.created_at.as_deref().and_then(parse_date).into(),
        }
    }
}

pub fn company_table(companies: &[&Company]) -> TextTable {
    let mut table = TextTable::new(["ID", "Company Name", "Description", "Created"]);
    for c in companies {
        table.push_row(vec![
            c.id.to_string(),
            c.company_name.clone(),
            c.company_desc.clone().unwrap_or_else(|| "-".to_string()),
            c.created_at.as_deref().map(display_date).unwrap_or_default(),
        ]);
    }
    table
}
