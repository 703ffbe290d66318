//! Form state, client-side validation and normalization into request payloads.
//!
//! Forms hold what the user typed as text. `validate` either produces the request payload or a set
//! of field-scoped errors; nothing is sent to the server until validation passes.

mod company;
mod customer;
mod signin;
mod transaction;

pub use company::{CompanyForm, COMPANY_DESC_MAX, COMPANY_NAME_MAX};
pub use customer::{Attachment, CustomerForm};
pub use signin::{SignInForm, SIGN_IN_FAILED};
pub use transaction::{PartyOption, TransactionForm};

pub(crate) use company::{COMPANY_CREATED, COMPANY_CREATE_FAILED};
pub(crate) use customer::{CUSTOMER_CREATED, CUSTOMER_CREATE_FAILED};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Field name to message. A form-wide problem uses the key `form`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub const FORM: &'static str = "form";

    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field`. The first message for a field is kept.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // A form-wide message is shown on its own, like a notification.
        if let Some(message) = self.get(Self::FORM) {
            return f.write_str(message);
        }
        let lines: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&lines.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// `None` for blank text, the trimmed text otherwise.
pub(crate) fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
