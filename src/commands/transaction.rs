//! `lendbook transaction ...`

use crate::args::{TransactionFields, TransactionListArgs};
use crate::commands::company::{list_out, table_state};
use crate::commands::{api_result, confirm, invalid, Out};
use crate::context::Context;
use crate::forms::{PartyOption, TransactionForm};
use crate::model::{Transaction, TransactionPayload};
use crate::router::Route;
use crate::table::Filter;
use crate::views::{transaction_detail, transaction_table, TransactionColumn};
use crate::Result;
use tracing::debug;

const TRANSACTION_SAVE_FAILED: &str = "Failed to save transaction";

/// Copies the given flags onto `form`. Flags that were not given leave the form as it is, so an
/// edit only changes what was asked for.
fn apply(form: &mut TransactionForm, fields: &TransactionFields) {
    let set = |target: &mut String, value: &Option<String>| {
        if let Some(value) = value {
            *target = value.clone();
        }
    };
    set(&mut form.company_id, &fields.company_id);
    set(&mut form.transaction_number_type, &fields.months);
    set(&mut form.transaction_date, &fields.date);
    set(&mut form.month, &fields.month);
    set(&mut form.amount_in_thousands, &fields.amount);
    set(&mut form.interest_recieved, &fields.interest_received);
    set(&mut form.interest_paid, &fields.interest_paid);
    set(&mut form.remarks, &fields.remarks);
    if let Some(t) = fields.transaction_type {
        form.transaction_type = t;
    }
    if let Some(status) = fields.status {
        form.a_p_status = status;
    }
    if !fields.lenders.is_empty() {
        form.lender_ids = fields.lenders.clone();
    }
    if !fields.borrowers.is_empty() {
        form.borrower_ids = fields.borrowers.clone();
    }
    if !fields.commissions.is_empty() {
        while form.commissions().len() > 1 {
            form.remove_commission(0);
        }
        for (ix, value) in fields.commissions.iter().enumerate() {
            form.set_commission(ix, value.as_str());
        }
    }
}

/// Validates the form, then checks the chosen parties against the current customer list.
async fn checked_payload(
    ctx: &Context,
    form: &TransactionForm,
) -> Result<TransactionPayload> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => return invalid(errors),
    };
    let customers = api_result(
        ctx.queries().customers().await,
        "Failed to load customers",
    )?;
    let lenders = PartyOption::lenders(&customers);
    let borrowers = PartyOption::borrowers(&customers);
    debug!(
        "Choosing from {} lenders and {} borrowers",
        lenders.len(),
        borrowers.len()
    );
    if let Err(errors) = form.check_parties(&lenders, &borrowers) {
        return invalid(errors);
    }
    Ok(payload)
}

/// Records a new transaction.
pub async fn create_transaction(ctx: &Context, fields: &TransactionFields) -> Result<Out<()>> {
    ctx.require(Route::CreateTransactions).await?;
    let mut form = TransactionForm::new();
    apply(&mut form, fields);
    let payload = checked_payload(ctx, &form).await?;
    let response = api_result(
        ctx.queries().create_transaction(&payload).await,
        TRANSACTION_SAVE_FAILED,
    )?;
    ctx.navigator().redirect(Route::ViewTransactions).await;
    Ok(response
        .message_or("Transaction created successfully")
        .into())
}

pub async fn list_transactions(
    ctx: &Context,
    args: &TransactionListArgs,
) -> Result<Out<Vec<Transaction>>> {
    ctx.require(Route::ViewTransactions).await?;
    let transactions = api_result(
        ctx.queries().transactions().await,
        "Failed to load transactions",
    )?;

    let mut state = table_state(&args.list);
    if let Some(search) = &args.search {
        state = state.filter(Filter::Contains {
            column: TransactionColumn::Company,
            text: search.clone(),
        });
    }
    if let Some(status) = args.status {
        state = state.filter(Filter::OneOf {
            column: TransactionColumn::Status,
            values: vec![status.to_string()],
        });
    }
    if let Some(column) = args.sort {
        state = state.sort_by(column, args.list.direction());
    }
    let view = state.with_page(args.list.page).apply(&transactions);
    let table = transaction_table(&view.rows);
    list_out("transactions", &args.list, view, table)
}

/// Shows every field of a transaction, as the edit page loads it.
pub async fn show_transaction(ctx: &Context, id: u64) -> Result<Out<Transaction>> {
    ctx.require(Route::EditTransaction(id)).await?;
    let transaction = api_result(
        ctx.queries().transaction(id).await,
        "Failed to load transaction",
    )?;
    let text = transaction_detail(&transaction);
    Ok(Out::new(format!("Transaction {id}"), transaction).with_text(text))
}

/// Loads a transaction into the form, applies the given flags and saves it.
pub async fn update_transaction(
    ctx: &Context,
    id: u64,
    fields: &TransactionFields,
) -> Result<Out<()>> {
    ctx.require(Route::EditTransaction(id)).await?;
    let current = api_result(
        ctx.queries().transaction(id).await,
        "Failed to load transaction",
    )?;
    let mut form = TransactionForm::from_transaction(&current);
    apply(&mut form, fields);
    let payload = checked_payload(ctx, &form).await?;
    let response = api_result(
        ctx.queries().update_transaction(id, &payload).await,
        TRANSACTION_SAVE_FAILED,
    )?;
    ctx.navigator().redirect(Route::ViewTransactions).await;
    Ok(response
        .message_or("Transaction updated successfully")
        .into())
}

pub async fn delete_transaction(ctx: &Context, id: u64, yes: bool) -> Result<Out<()>> {
    ctx.require(Route::ViewTransactions).await?;
    confirm(&format!("transaction {id}"), yes)?;
    let response = api_result(
        ctx.queries().delete_transaction(id).await,
        "Failed to delete transaction",
    )?;
    Ok(response
        .message_or("Transaction deleted successfully")
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Body, Method};
    use crate::error::{error_type, ErrorType};
    use crate::model::{ApStatus, TransactionType};
    use crate::test::TestEnv;
    use serde_json::json;

    fn example() -> TransactionFields {
        TransactionFields {
            company_id: Some("1".into()),
            transaction_type: Some(TransactionType::S),
            months: Some("1".into()),
            date: Some("2024-01-01".into()),
            amount: Some("100".into()),
            status: Some(ApStatus::Advanced),
            lenders: vec![1],
            borrowers: vec![2],
            interest_received: Some(String::new()),
            interest_paid: Some(String::new()),
            commissions: vec!["2".into()],
            ..TransactionFields::default()
        }
    }

    #[tokio::test]
    async fn test_create_posts_numeric_payload() {
        let env = TestEnv::new().await;
        let out = create_transaction(&env.context, &example()).await.unwrap();
        assert_eq!(out.message(), "Transaction created successfully");
        assert_eq!(
            env.context.navigator().current().await,
            Route::ViewTransactions
        );

        let requests = env.server.requests().await;
        let post = requests
            .iter()
            .find(|r| r.method == Method::Post)
            .unwrap();
        assert_eq!(
            post.body,
            Body::Json(json!({
                "company_id": 1,
                "transaction_type": "S",
                "transaction_number_type": 1,
                "transaction_date": "2024-01-01",
                "amount_in_thousands": 100,
                "a_p_status": "advanced",
                "lender_ids": [1],
                "borrower_ids": [2],
                "comission_percentage": [2]
            }))
        );
    }

    #[tokio::test]
    async fn test_no_lenders_sends_nothing() {
        let env = TestEnv::new().await;
        let mut fields = example();
        fields.lenders.clear();
        let e = create_transaction(&env.context, &fields).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert_eq!(
            format!("{e}"),
            "Please select at least one lender and one borrower"
        );
        assert!(env.server.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_borrower_chosen_as_lender() {
        let env = TestEnv::new().await;
        let mut fields = example();
        fields.lenders = vec![2];
        let e = create_transaction(&env.context, &fields).await.unwrap_err();
        assert_eq!(format!("{e}"), "lender_ids: Customer 2 is not a lender");
        assert_eq!(env.server.count("transactions").await, 0);
    }

    #[tokio::test]
    async fn test_update_keeps_unchanged_fields() {
        let env = TestEnv::new().await;
        let fields = TransactionFields {
            amount: Some("150".into()),
            ..TransactionFields::default()
        };
        update_transaction(&env.context, 1, &fields).await.unwrap();

        let out = show_transaction(&env.context, 1).await.unwrap();
        let t = out.structure().unwrap();
        assert_eq!(t.amount_in_thousands.plain(), "150");
        assert_eq!(t.lender_ids(), vec![1]);
        assert_eq!(t.remarks.as_deref(), Some("First loan"));
        assert!(out.text().unwrap().contains("First loan"));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let env = TestEnv::new().await;
        let mut args = TransactionListArgs::default();
        args.status = Some(ApStatus::Past);
        let out = list_transactions(&env.context, &args).await.unwrap();
        let ids: Vec<u64> = out.structure().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        assert!(delete_transaction(&env.context, 2, false).await.is_err());
        let out = delete_transaction(&env.context, 2, true).await.unwrap();
        assert_eq!(out.message(), "Transaction deleted successfully");
        let e = show_transaction(&env.context, 2).await.unwrap_err();
        assert!(format!("{e:#}").contains("Transaction not found"));
    }
}
