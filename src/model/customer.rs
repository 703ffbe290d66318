use crate::model::Company;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A lender and/or borrower registered under a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: u64,
    #[serde(default)]
    pub is_borrower: bool,
    #[serde(default)]
    pub is_lender: bool,
    pub full_name: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Identity, business and bank details, plus document locations, keyed by their wire names.
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

impl Customer {
    /// `Borrower`, `Lender` or `Borrower, Lender`.
    pub fn roles(&self) -> String {
        let mut roles = Vec::new();
        if self.is_borrower {
            roles.push("Borrower");
        }
        if self.is_lender {
            roles.push("Lender");
        }
        roles.join(", ")
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company
            .as_ref()
            .map(|c| c.company_name.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn status(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }

    /// A text detail such as `panNumber`, if the server sent one.
    pub fn detail(&self, field: CustomerField) -> Option<String> {
        match self.details.get(&field.to_string())? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// The free-text fields of the customer form, named as they are sent to the server.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerField {
    FullName,
    EmailAddress,
    MobileNumber,
    AlternateMobileNumber,
    LenderGroup,
    BorrowerGroup,
    PanNumber,
    AadharNumber,
    Address,
    BusinessName,
    GstNumber,
    BusinessAddress,
    NatureOfBusiness,
    TypeOfBusiness,
    CompanyPanNumber,
    BankName,
    AccountNumber,
    IfscCode,
    BranchName,
    City,
    AccountHolderName,
}

serde_plain::derive_display_from_serialize!(CustomerField);
serde_plain::derive_fromstr_from_deserialize!(CustomerField);

impl CustomerField {
    pub const ALL: [CustomerField; 21] = [
        CustomerField::FullName,
        CustomerField::EmailAddress,
        CustomerField::MobileNumber,
        CustomerField::AlternateMobileNumber,
        CustomerField::LenderGroup,
        CustomerField::BorrowerGroup,
        CustomerField::PanNumber,
        CustomerField::AadharNumber,
        CustomerField::Address,
        CustomerField::BusinessName,
        CustomerField::GstNumber,
        CustomerField::BusinessAddress,
        CustomerField::NatureOfBusiness,
        CustomerField::TypeOfBusiness,
        CustomerField::CompanyPanNumber,
        CustomerField::BankName,
        CustomerField::AccountNumber,
        CustomerField::IfscCode,
        CustomerField::BranchName,
        CustomerField::City,
        CustomerField::AccountHolderName,
    ];

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            CustomerField::FullName | CustomerField::EmailAddress | CustomerField::MobileNumber
        )
    }
}

/// A document that can be attached to a new customer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    PanCard,
    Aadhar,
    CompanyPan,
    VisitingCard,
}

serde_plain::derive_display_from_serialize!(DocumentKind);
serde_plain::derive_fromstr_from_deserialize!(DocumentKind);

impl DocumentKind {
    /// The name of the multipart part the server expects for this document.
    pub fn part_name(&self) -> &'static str {
        match self {
            DocumentKind::PanCard => "panCard",
            DocumentKind::Aadhar => "aadhar",
            DocumentKind::CompanyPan => "companyPan",
            DocumentKind::VisitingCard => "visitingCard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_customer_with_details() {
        let customer: Customer = serde_json::from_value(json!({
            "id": 2,
            "isBorrower": true,
            "isLender": false,
            "fullName": "Ravi Kumar",
            "emailAddress": "ravi@example.com",
            "mobileNumber": "9000000001",
            "panNumber": "ABCDE1234F",
            "company": {"id": 1, "companyName": "Acme Finance"},
            "isActive": true
        }))
        .unwrap();
        assert_eq!(customer.roles(), "Borrower");
        assert_eq!(customer.company_name(), Some("Acme Finance"));
        assert_eq!(
            customer.detail(CustomerField::PanNumber).as_deref(),
            Some("ABCDE1234F")
        );
        assert_eq!(customer.detail(CustomerField::City), None);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(CustomerField::IfscCode.to_string(), "ifscCode");
        assert_eq!(
            CustomerField::from_str("accountHolderName").unwrap(),
            CustomerField::AccountHolderName
        );
        assert_eq!(DocumentKind::from_str("visiting-card").unwrap().part_name(), "visitingCard");
    }
}
