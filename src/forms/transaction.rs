use crate::forms::{non_blank, ValidationErrors};
use crate::model::{Amount, ApStatus, Customer, Transaction, TransactionPayload, TransactionType};
use chrono::NaiveDate;
use std::str::FromStr;

pub(crate) const REQUIRED_FIELDS: &str = "Please fill required fields (*)";
pub(crate) const PARTIES_REQUIRED: &str = "Please select at least one lender and one borrower";

/// A customer that can be picked as a lender or a borrower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyOption {
    pub id: u64,
    pub name: String,
}

impl PartyOption {
    pub fn lenders(customers: &[Customer]) -> Vec<PartyOption> {
        Self::filtered(customers, |c| c.is_lender)
    }

    pub fn borrowers(customers: &[Customer]) -> Vec<PartyOption> {
        Self::filtered(customers, |c| c.is_borrower)
    }

    fn filtered(customers: &[Customer], keep: impl Fn(&Customer) -> bool) -> Vec<PartyOption> {
        customers
            .iter()
            .filter(|c| keep(c))
            .map(|c| PartyOption {
                id: c.id,
                name: c.full_name.clone(),
            })
            .collect()
    }
}

/// The create and edit transaction form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionForm {
    pub company_id: String,
    pub transaction_type: TransactionType,
    pub transaction_number_type: String,
    pub transaction_date: String,
    pub month: String,
    pub amount_in_thousands: String,
    pub a_p_status: ApStatus,
    pub lender_ids: Vec<u64>,
    pub borrower_ids: Vec<u64>,
    pub interest_recieved: String,
    pub interest_paid: String,
    comission_percentage: Vec<String>,
    pub remarks: String,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self {
            company_id: String::new(),
            transaction_type: TransactionType::S,
            transaction_number_type: "1".to_string(),
            transaction_date: String::new(),
            month: String::new(),
            amount_in_thousands: String::new(),
            a_p_status: ApStatus::Advanced,
            lender_ids: Vec::new(),
            borrower_ids: Vec::new(),
            interest_recieved: "0".to_string(),
            interest_paid: "0".to_string(),
            comission_percentage: vec![String::new()],
            remarks: String::new(),
        }
    }
}

impl TransactionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills the form for editing an existing transaction.
    pub fn from_transaction(t: &Transaction) -> Self {
        let text = |a: Option<Amount>| a.map(|a| a.plain()).unwrap_or_else(|| "0".to_string());
        let commissions: Vec<String> = t.comission_percentage.iter().map(Amount::plain).collect();
        Self {
            company_id: t.company_id().map(|id| id.to_string()).unwrap_or_default(),
            transaction_type: t.transaction_type,
            transaction_number_type: t.transaction_number_type.to_string(),
            transaction_date: t
                .transaction_date
                .split('T')
                .next()
                .unwrap_or_default()
                .to_string(),
            month: t.month.clone().unwrap_or_default(),
            amount_in_thousands: t.amount_in_thousands.plain(),
            a_p_status: t.a_p_status,
            lender_ids: t.lender_ids(),
            borrower_ids: t.borrower_ids(),
            interest_recieved: text(t.interest_recieved),
            interest_paid: text(t.interest_paid),
            comission_percentage: if commissions.is_empty() {
                vec![String::new()]
            } else {
                commissions
            },
            remarks: t.remarks.clone().unwrap_or_default(),
        }
    }

    pub fn commissions(&self) -> &[String] {
        &self.comission_percentage
    }

    /// Appends a blank commission entry.
    pub fn add_commission(&mut self) -> &mut Self {
        self.comission_percentage.push(String::new());
        self
    }

    /// Sets entry `index`, appending blank entries up to it when needed.
    pub fn set_commission(&mut self, index: usize, value: impl Into<String>) -> &mut Self {
        if index >= self.comission_percentage.len() {
            self.comission_percentage.resize(index + 1, String::new());
        }
        self.comission_percentage[index] = value.into();
        self
    }

    /// Removes entry `index`. The list always keeps at least one entry.
    pub fn remove_commission(&mut self, index: usize) -> &mut Self {
        if index < self.comission_percentage.len() {
            self.comission_percentage.remove(index);
        }
        if self.comission_percentage.is_empty() {
            self.comission_percentage.push(String::new());
        }
        self
    }

    /// Checks the form and coerces it into a payload. Runs before anything is sent.
    pub fn validate(&self) -> Result<TransactionPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let required = [
            ("company_id", &self.company_id),
            ("transaction_date", &self.transaction_date),
            ("amount_in_thousands", &self.amount_in_thousands),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.add(ValidationErrors::FORM, REQUIRED_FIELDS);
                errors.add(field, "Required");
            }
        }
        if self.lender_ids.is_empty() || self.borrower_ids.is_empty() {
            errors.add(ValidationErrors::FORM, PARTIES_REQUIRED);
            if self.lender_ids.is_empty() {
                errors.add("lender_ids", "Select at least one lender");
            }
            if self.borrower_ids.is_empty() {
                errors.add("borrower_ids", "Select at least one borrower");
            }
        }

        let company_id = parse_field(&mut errors, "company_id", &self.company_id, |s| {
            s.parse::<u64>().ok()
        });
        let transaction_date = parse_field(&mut errors, "transaction_date", &self.transaction_date, |s| {
            NaiveDate::parse_from_str(s.split('T').next().unwrap_or(s), "%Y-%m-%d").ok()
        });
        let number_type = parse_field(
            &mut errors,
            "transaction_number_type",
            &self.transaction_number_type,
            |s| s.parse::<u32>().ok().filter(|n| *n > 0),
        );
        let amount = parse_field(&mut errors, "amount_in_thousands", &self.amount_in_thousands, parse_amount);
        let interest_recieved =
            parse_field(&mut errors, "interest_recieved", &self.interest_recieved, parse_amount);
        let interest_paid = parse_field(&mut errors, "interest_paid", &self.interest_paid, parse_amount);

        // a blank commission entry is sent as 0
        let mut commissions = Vec::new();
        for (ix, value) in self.comission_percentage.iter().enumerate() {
            let field = format!("comission_percentage[{ix}]");
            if value.trim().is_empty() {
                commissions.push(Amount::from(0i64));
            } else if let Some(c) = parse_field(&mut errors, &field, value, parse_amount) {
                commissions.push(c);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        match (company_id, transaction_date, amount) {
            (Some(company_id), Some(transaction_date), Some(amount_in_thousands)) => {
                Ok(TransactionPayload {
                    company_id,
                    transaction_type: self.transaction_type,
                    transaction_number_type: number_type.unwrap_or(1),
                    transaction_date,
                    month: non_blank(&self.month),
                    amount_in_thousands,
                    a_p_status: self.a_p_status,
                    lender_ids: self.lender_ids.clone(),
                    borrower_ids: self.borrower_ids.clone(),
                    interest_recieved,
                    interest_paid,
                    comission_percentage: commissions,
                    remarks: non_blank(&self.remarks),
                })
            }
            _ => {
                errors.add(ValidationErrors::FORM, REQUIRED_FIELDS);
                Err(errors)
            }
        }
    }

    /// Every chosen lender and borrower must come from the matching option list.
    pub fn check_parties(
        &self,
        lenders: &[PartyOption],
        borrowers: &[PartyOption],
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for id in &self.lender_ids {
            if !lenders.iter().any(|o| o.id == *id) {
                errors.add("lender_ids", format!("Customer {id} is not a lender"));
            }
        }
        for id in &self.borrower_ids {
            if !borrowers.iter().any(|o| o.id == *id) {
                errors.add("borrower_ids", format!("Customer {id} is not a borrower"));
            }
        }
        errors.into_result(|| ())
    }
}

fn parse_amount(s: &str) -> Option<Amount> {
    Amount::from_str(s).ok()
}

/// Blank text is `None` without an error; text that does not parse is a field error.
fn parse_field<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = parse(value);
    if parsed.is_none() {
        errors.add(field, format!("'{value}' is not valid"));
    }
    parsed
}
