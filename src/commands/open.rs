//! `lendbook open <path>` and the dashboard page.

use crate::args::{CashbookArgs, CompanyListArgs, CustomerListArgs, TransactionListArgs};
use crate::commands::{
    api_result, cashbook, list_companies, list_customers, list_transactions, show_transaction,
    slip, Out,
};
use crate::context::Context;
use crate::error::{ErrorType, IntoResult};
use crate::router::Route;
use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;

/// The counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub companies: usize,
    pub customers: usize,
    pub transactions: usize,
    pub lenders: usize,
    pub borrowers: usize,
}

impl Dashboard {
    fn render(&self) -> String {
        [
            ("Companies", self.companies),
            ("Customers", self.customers),
            ("Lenders", self.lenders),
            ("Borrowers", self.borrowers),
            ("Transactions", self.transactions),
        ]
        .iter()
        .map(|(label, n)| format!("{label:<14}{n}"))
        .collect::<Vec<_>>()
        .join("\n")
    }
}

pub async fn dashboard(ctx: &Context) -> crate::Result<Out<Dashboard>> {
    ctx.require(Route::Dashboard).await?;
    let queries = ctx.queries();
    let companies = api_result(queries.companies().await, "Failed to load companies")?;
    let customers = api_result(queries.customers().await, "Failed to load customers")?;
    let transactions = api_result(queries.transactions().await, "Failed to load transactions")?;
    let dashboard = Dashboard {
        companies: companies.len(),
        customers: customers.len(),
        transactions: transactions.len(),
        lenders: customers.iter().filter(|c| c.is_lender).count(),
        borrowers: customers.iter().filter(|c| c.is_borrower).count(),
    };
    let text = dashboard.render();
    Ok(Out::new("Dashboard", dashboard).with_text(text))
}

/// Opens a page by its path, e.g. `/view-slips/4?type=borrower`. Pages that show data run the
/// matching command with its defaults. Form pages only say which command fills them in.
pub async fn open(ctx: &Context, path: &str) -> crate::Result<Out<Value>> {
    let route = Route::parse(path);
    Ok(match route {
        Route::Dashboard => dashboard(ctx).await?.into_json(),
        Route::SignIn => {
            ctx.navigator().redirect(Route::SignIn).await;
            Out::new_message("Sign in with 'lendbook login --email <email>'")
        }
        Route::CreateCompany => form(ctx, Route::CreateCompany, "company create").await?,
        Route::CreateUser => form(ctx, Route::CreateUser, "customer create").await?,
        Route::CreateTransactions => {
            form(ctx, Route::CreateTransactions, "transaction create").await?
        }
        Route::ViewCompany => list_companies(ctx, &CompanyListArgs::default())
            .await?
            .into_json(),
        Route::ViewUser => list_customers(ctx, &CustomerListArgs::default())
            .await?
            .into_json(),
        Route::ViewTransactions => list_transactions(ctx, &TransactionListArgs::default())
            .await?
            .into_json(),
        Route::EditTransaction(id) => show_transaction(ctx, id).await?.into_json(),
        Route::ViewSlip { id, role } => slip(ctx, id, role).await?.into_json(),
        Route::Cashbook => cashbook(ctx, &CashbookArgs::default()).await?.into_json(),
        Route::NotFound(path) => {
            return Err(anyhow!("Page not found: {path}")).pub_result(ErrorType::Config)
        }
    })
}

async fn form(ctx: &Context, route: Route, command: &str) -> crate::Result<Out<Value>> {
    ctx.require(route).await?;
    Ok(Out::new_message(format!(
        "Fill in this form with 'lendbook {command}'"
    )))
}
