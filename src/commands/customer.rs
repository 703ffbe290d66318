//! `lendbook customer ...`

use crate::args::{CreateCustomerArgs, CustomerListArgs};
use crate::commands::company::{list_out, table_state};
use crate::commands::{api_result, confirm, invalid, Out};
use crate::context::Context;
use crate::error::{ErrorType, IntoResult};
use crate::forms::{Attachment, CustomerForm, CUSTOMER_CREATED, CUSTOMER_CREATE_FAILED};
use crate::model::{Customer, CustomerField, DocumentKind, PartyRole};
use crate::router::Route;
use crate::table::Filter;
use crate::views::{customer_table, CustomerColumn};
use crate::Result;

/// Registers a customer. The text fields are checked first, then documents are read from disk
/// and uploaded with the form.
pub async fn create_customer(ctx: &Context, args: &CreateCustomerArgs) -> Result<Out<Customer>> {
    ctx.require(Route::CreateUser).await?;

    let mut form = CustomerForm::new();
    form.is_lender = args.lender;
    form.is_borrower = args.borrower;
    form.company_id = args.company_id.clone();
    form.set(CustomerField::FullName, args.full_name.as_str())
        .set(CustomerField::EmailAddress, args.email.as_str())
        .set(CustomerField::MobileNumber, args.mobile.as_str());
    for (field, value) in &args.details {
        form.set(*field, value.as_str());
    }

    if let Err(errors) = form.validate() {
        return invalid(errors);
    }
    let documents = [
        (DocumentKind::PanCard, &args.pan_card),
        (DocumentKind::Aadhar, &args.aadhar),
        (DocumentKind::CompanyPan, &args.company_pan),
        (DocumentKind::VisitingCard, &args.visiting_card),
    ];
    for (kind, path) in documents {
        if let Some(path) = path {
            let attachment = Attachment::read(kind, path)
                .await
                .pub_result(ErrorType::Config)?;
            form.attach(attachment);
        }
    }

    let parts = match form.validate() {
        Ok(parts) => parts,
        Err(errors) => return invalid(errors),
    };
    let response = api_result(
        ctx.queries().create_customer(parts).await,
        CUSTOMER_CREATE_FAILED,
    )?;
    ctx.navigator().redirect(Route::ViewUser).await;
    Ok(Out::new(response.message_or(CUSTOMER_CREATED), response.data))
}

pub async fn list_customers(ctx: &Context, args: &CustomerListArgs) -> Result<Out<Vec<Customer>>> {
    ctx.require(Route::ViewUser).await?;
    let customers = api_result(
        ctx.queries().customers().await,
        "Failed to load customers",
    )?;

    let mut state = table_state(&args.list);
    if let Some(search) = &args.search {
        state = state.filter(Filter::Contains {
            column: CustomerColumn::Name,
            text: search.clone(),
        });
    }
    if let Some(role) = args.role {
        let text = match role {
            PartyRole::Lender => "Lender",
            PartyRole::Borrower => "Borrower",
        };
        state = state.filter(Filter::Contains {
            column: CustomerColumn::Role,
            text: text.to_string(),
        });
    }
    if let Some(status) = args.status {
        state = state.filter(Filter::OneOf {
            column: CustomerColumn::Status,
            values: vec![status.to_string()],
        });
    }
    if let Some(column) = args.sort {
        state = state.sort_by(column, args.list.direction());
    }
    let view = state.with_page(args.list.page).apply(&customers);
    let table = customer_table(&view.rows);
    list_out("customers", &args.list, view, table)
}

/// Activates or deactivates a customer.
pub async fn toggle_customer_status(ctx: &Context, id: u64) -> Result<Out<()>> {
    ctx.require(Route::ViewUser).await?;
    let response = api_result(
        ctx.queries().toggle_customer_status(id).await,
        "Failed to update customer status",
    )?;
    Ok(response.message_or("Customer status updated").into())
}

pub async fn delete_customer(ctx: &Context, id: u64, yes: bool) -> Result<Out<()>> {
    ctx.require(Route::ViewUser).await?;
    confirm(&format!("customer {id}"), yes)?;
    let response = api_result(
        ctx.queries().delete_customer(id).await,
        "Failed to delete customer",
    )?;
    Ok(response.message_or("Customer deleted successfully").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Body, Part};
    use crate::error::error_type;
    use crate::test::TestEnv;
    use tempfile::TempDir;

    fn asha_args() -> CreateCustomerArgs {
        CreateCustomerArgs {
            lender: true,
            full_name: "Kiran Rao".into(),
            email: "kiran@example.com".into(),
            mobile: "9000000009".into(),
            company_id: "2".into(),
            details: vec![(CustomerField::City, "Pune".into())],
            ..CreateCustomerArgs::default()
        }
    }

    #[tokio::test]
    async fn test_create_customer_with_document() {
        let env = TestEnv::new().await;
        let dir = TempDir::new().unwrap();
        let pan = dir.path().join("pan.jpg");
        std::fs::write(&pan, b"jpeg").unwrap();
        let mut args = asha_args();
        args.pan_card = Some(pan);

        let out = create_customer(&env.context, &args).await.unwrap();
        let customer = out.structure().unwrap();
        assert_eq!(customer.full_name, "Kiran Rao");
        assert!(customer.is_lender && !customer.is_borrower);
        assert_eq!(env.context.navigator().current().await, Route::ViewUser);

        let requests = env.server.requests().await;
        let Body::Multipart(parts) = &requests[0].body else {
            panic!("not multipart");
        };
        assert!(parts.contains(&Part::Text {
            name: "city".into(),
            value: "Pune".into()
        }));
        assert!(parts.iter().any(|p| p.name() == "panCard"));
        assert!(!parts.iter().any(|p| p.name() == "panNumber"));
    }

    #[tokio::test]
    async fn test_create_customer_needs_a_role() {
        let env = TestEnv::new().await;
        let mut args = asha_args();
        args.lender = false;
        let e = create_customer(&env.context, &args).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert_eq!(format!("{e}"), "Select at least one: Borrower or Lender");
        assert!(env.server.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_document_file() {
        let env = TestEnv::new().await;
        let mut args = asha_args();
        args.aadhar = Some("/definitely/not/here.png".into());
        let e = create_customer(&env.context, &args).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Config));
        assert!(env.server.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_field_errors_come_before_document_files() {
        let env = TestEnv::new().await;
        let mut args = asha_args();
        args.lender = false;
        args.aadhar = Some("/definitely/not/here.png".into());
        let e = create_customer(&env.context, &args).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert_eq!(format!("{e}"), "Select at least one: Borrower or Lender");
        assert!(env.server.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let env = TestEnv::new().await;
        let mut args = CustomerListArgs::default();
        args.role = Some(PartyRole::Lender);
        let out = list_customers(&env.context, &args).await.unwrap();
        let ids: Vec<u64> = out.structure().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);

        args.role = None;
        args.search = Some("ravi".into());
        let out = list_customers(&env.context, &args).await.unwrap();
        assert_eq!(out.structure().unwrap()[0].id, 2);
    }

    #[tokio::test]
    async fn test_toggle_then_list_shows_new_status() {
        let env = TestEnv::new().await;
        let mut args = CustomerListArgs::default();
        args.status = Some(crate::args::CustomerStatus::Inactive);
        assert!(list_customers(&env.context, &args)
            .await
            .unwrap()
            .structure()
            .unwrap()
            .is_empty());

        let out = toggle_customer_status(&env.context, 1).await.unwrap();
        assert_eq!(out.message(), "Customer deactivated");

        let out = list_customers(&env.context, &args).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
        assert_eq!(env.server.count("customers").await, 2);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let env = TestEnv::new().await;
        let e = delete_customer(&env.context, 3, false).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert!(env.server.requests().await.is_empty());

        // customer 3 is a party to a transaction
        let e = delete_customer(&env.context, 3, true).await.unwrap_err();
        assert!(format!("{e}").starts_with("Customer is part of a transaction"));
    }
}
