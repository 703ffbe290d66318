//! Command handlers for the lendbook CLI.
//!
//! Every handler takes the session `Context`, enters the page it belongs to (which fails when the
//! page needs a credential that is not there), validates its input before any request is made, and
//! returns an `Out` with the notification text, the data it produced and, for pages, the rendered
//! view.

mod auth;
mod cashbook;
mod company;
mod console;
mod customer;
mod init;
mod open;
mod slip;
mod transaction;

use crate::api::ApiError;
use crate::args::{Command, CompanyCommand, CustomerCommand, TransactionCommand};
use crate::context::Context;
use crate::error::{user_message, ErrorType, IntoResult};
use crate::forms::ValidationErrors;
use crate::{Error, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{login, logout, whoami};
pub use cashbook::cashbook;
pub use company::{create_company, list_companies};
pub use console::console;
pub use customer::{create_customer, delete_customer, list_customers, toggle_customer_status};
pub use init::init;
pub use open::{dashboard, open, Dashboard};
pub use slip::slip;
pub use transaction::{
    create_transaction, delete_transaction, list_transactions, show_transaction,
    update_transaction,
};

/// The output type for a command. This allows the command to return a consistent message,
/// optionally structured data, and the text of the page it rendered.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// A rendered page, printed to stdout.
    #[serde(skip)]
    text: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            text: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            text: None,
        }
    }

    /// Attach the rendered page.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Get the rendered page, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Converts the structured data to JSON, for callers that handle many kinds of output.
    pub fn into_json(self) -> Out<serde_json::Value> {
        Out {
            message: self.message,
            structure: self
                .structure
                .and_then(|s| serde_json::to_value(s).ok()),
            text: self.text,
        }
    }

    /// Print the rendered page to stdout, the message to `info!` and the structured data (if it
    /// exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(text) = self.text() {
            println!("{text}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Runs one command against an open session and prints its output. `init` and `console` are
/// handled before a session exists and are refused here.
pub async fn run(ctx: &Context, command: &Command) -> Result<()> {
    match command {
        Command::Init(_) | Command::Console => {
            return Err(anyhow!("This command cannot be run from here")).pub_result(ErrorType::Config)
        }
        Command::Login(args) => login(ctx, args).await?.print(),
        Command::Logout => logout(ctx).await?.print(),
        Command::Whoami => whoami(ctx).await?.print(),
        Command::Company(CompanyCommand::Create(args)) => create_company(ctx, args).await?.print(),
        Command::Company(CompanyCommand::List(args)) => list_companies(ctx, args).await?.print(),
        Command::Customer(CustomerCommand::Create(args)) => {
            create_customer(ctx, args).await?.print()
        }
        Command::Customer(CustomerCommand::List(args)) => list_customers(ctx, args).await?.print(),
        Command::Customer(CustomerCommand::ToggleStatus(args)) => {
            toggle_customer_status(ctx, args.id()).await?.print()
        }
        Command::Customer(CustomerCommand::Delete(args)) => {
            delete_customer(ctx, args.id(), args.yes()).await?.print()
        }
        Command::Transaction(TransactionCommand::Create(fields)) => {
            create_transaction(ctx, fields).await?.print()
        }
        Command::Transaction(TransactionCommand::List(args)) => {
            list_transactions(ctx, args).await?.print()
        }
        Command::Transaction(TransactionCommand::Show(args)) => {
            show_transaction(ctx, args.id()).await?.print()
        }
        Command::Transaction(TransactionCommand::Update(args)) => {
            update_transaction(ctx, args.id(), args.fields()).await?.print()
        }
        Command::Transaction(TransactionCommand::Delete(args)) => {
            delete_transaction(ctx, args.id(), args.yes()).await?.print()
        }
        Command::Slip(args) => slip(ctx, args.id(), args.role()).await?.print(),
        Command::Cashbook(args) => cashbook(ctx, args).await?.print(),
        Command::Open(args) => open(ctx, args.path()).await?.print(),
    }
    Ok(())
}

/// Turns a failed API call into the notification the user sees: the server's message when it sent
/// one, `fallback` otherwise. The `ApiError` stays in the chain and decides the `ErrorType`.
pub(crate) fn api_result<T>(result: std::result::Result<T, ApiError>, fallback: &str) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            let error_type = ErrorType::from(&e);
            let e = Error::new(e);
            let message = user_message(&e, fallback);
            Err(e.context(message)).pub_result(error_type)
        }
    }
}

/// Client-side validation failures block the command before anything is sent.
pub(crate) fn invalid<T>(errors: ValidationErrors) -> Result<T> {
    Err(Error::new(errors)).pub_result(ErrorType::Validation)
}

/// Fails with a validation error unless the user confirmed a deletion.
pub(crate) fn confirm(what: &str, yes: bool) -> Result<()> {
    if yes {
        return Ok(());
    }
    let mut errors = ValidationErrors::new();
    errors.add(
        ValidationErrors::FORM,
        format!("Pass --yes to confirm deleting {what}"),
    );
    invalid(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{api_error, error_type};

    #[test]
    fn test_api_result_uses_server_message() {
        let e = api_result::<()>(
            Err(ApiError::Server {
                status: 409,
                message: Some("Company already exists".into()),
            }),
            "Failed to create company",
        )
        .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Server));
        assert!(format!("{e}").starts_with("Company already exists"));
        assert!(api_error(&e).is_some());
    }

    #[test]
    fn test_api_result_falls_back() {
        let e = api_result::<()>(
            Err(ApiError::Network("connection refused".into())),
            "Failed to create company",
        )
        .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Network));
        assert!(format!("{e}").starts_with("Failed to create company"));
    }

    #[test]
    fn test_confirm() {
        assert!(confirm("customer 3", true).is_ok());
        let e = confirm("customer 3", false).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert_eq!(format!("{e}"), "Pass --yes to confirm deleting customer 3");
    }

    #[test]
    fn test_out_json() {
        let out = Out::new("done", vec![1, 2]).with_text("table");
        let json = out.into_json();
        assert_eq!(json.structure(), Some(&serde_json::json!([1, 2])));
        assert_eq!(json.text(), Some("table"));
    }
}
