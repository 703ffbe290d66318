use crate::model::Customer;
use crate::table::{CellValue, Row};
use crate::views::TextTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CustomerColumn {
    Id,
    Name,
    Email,
    Mobile,
    Company,
    Role,
    Status,
}

serde_plain::derive_display_from_serialize!(CustomerColumn);
serde_plain::derive_fromstr_from_deserialize!(CustomerColumn);

impl Row for Customer {
    type Column = CustomerColumn;

    fn cell(&self, column: CustomerColumn) -> CellValue {
        match column {
            CustomerColumn::Id => self.id.into(),
            CustomerColumn::Name => self.full_name.as_str().into(),
            CustomerColumn::Email => self.email_address.as_str().into(),
            CustomerColumn::Mobile => self.mobile_number.as_str().into(),
            CustomerColumn::Company => self.company_name().unwrap_or_default().into(),
            CustomerColumn::Role => self.roles().into(),
            CustomerColumn::Status => self.status().into(),
        }
    }
}

pub fn customer_table(customers: &[&Customer]) -> TextTable {
    let mut table = TextTable::new([
        "ID", "Full Name", "Email", "Mobile", "Company", "Role", "Status",
    ]);
    for c in customers {
        table.push_row(vec![
            c.id.to_string(),
            c.full_name.clone(),
            c.email_address.clone(),
            c.mobile_number.clone(),
            c.company_name()
                .map(str::to_string)
                .or_else(|| c.company_id.map(|id| format!("#{id}")))
                .unwrap_or_else(|| "-".to_string()),
            c.roles(),
            c.status().to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_rows() {
        let c: Customer = serde_json::from_value(json!({
            "id": 3, "isBorrower": true, "isLender": true, "fullName": "Meena Iyer",
            "emailAddress": "meena@example.com", "mobileNumber": "9000000003",
            "companyId": 2, "isActive": false
        }))
        .unwrap();
        let table = customer_table(&[&c]);
        assert_eq!(
            table.rows()[0],
            vec![
                "3",
                "Meena Iyer",
                "meena@example.com",
                "9000000003",
                "#2",
                "Borrower, Lender",
                "Inactive"
            ]
        );
        assert_eq!(c.cell(CustomerColumn::Status).text(), "Inactive");
    }
}
