use crate::model::{number_or_string, Amount, Company};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Single (`S`) or monthly (`M`) transaction.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    S,
    M,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// Whether interest is taken in advance or paid past the term.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApStatus {
    #[default]
    Advanced,
    Past,
}

serde_plain::derive_display_from_serialize!(ApStatus);
serde_plain::derive_fromstr_from_deserialize!(ApStatus);

impl ApStatus {
    /// `Advanced` or `Past`.
    pub fn label(&self) -> &'static str {
        match self {
            ApStatus::Advanced => "Advanced",
            ApStatus::Past => "Past",
        }
    }
}

/// A lender or borrower as it appears inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: u64,
    #[serde(default)]
    pub full_name: String,
}

/// A transaction as returned by the server. The field names, including the misspelled
/// `interest_recieved` and `comission_percentage`, are the server's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,
    pub transaction_type: TransactionType,
    #[serde(default = "one", deserialize_with = "number_or_string")]
    pub transaction_number_type: u32,
    pub transaction_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub amount_in_thousands: Amount,
    #[serde(default)]
    pub a_p_status: ApStatus,
    #[serde(default)]
    pub lenders: Vec<Party>,
    #[serde(default)]
    pub borrowers: Vec<Party>,
    #[serde(default)]
    pub interest_recieved: Option<Amount>,
    #[serde(default)]
    pub interest_paid: Option<Amount>,
    #[serde(default)]
    pub comission_percentage: Vec<Amount>,
    #[serde(default)]
    pub remarks: Option<String>,
}

fn one() -> u32 {
    1
}

impl Transaction {
    /// The id of the company, from the nested company or the flat `company_id`.
    pub fn company_id(&self) -> Option<u64> {
        self.company.as_ref().map(|c| c.id).or(self.company_id)
    }

    pub fn company_name(&self) -> &str {
        self.company
            .as_ref()
            .map(|c| c.company_name.as_str())
            .unwrap_or_default()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        crate::model::parse_date(&self.transaction_date)
    }

    pub fn lender_ids(&self) -> Vec<u64> {
        self.lenders.iter().map(|p| p.id).collect()
    }

    pub fn borrower_ids(&self) -> Vec<u64> {
        self.borrowers.iter().map(|p| p.id).collect()
    }
}

/// The body of `POST /transactions` and `PATCH /transactions/:id`. Optional values that were left
/// blank are not sent at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub company_id: u64,
    pub transaction_type: TransactionType,
    pub transaction_number_type: u32,
    pub transaction_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub amount_in_thousands: Amount,
    pub a_p_status: ApStatus,
    pub lender_ids: Vec<u64>,
    pub borrower_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_recieved: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_paid: Option<Amount>,
    pub comission_percentage: Vec<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}
