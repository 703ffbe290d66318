//! `lendbook company create` and `lendbook company list`.

use crate::args::{CompanyListArgs, CreateCompanyArgs, ListArgs};
use crate::commands::{api_result, invalid, Out};
use crate::context::Context;
use crate::forms::{CompanyForm, COMPANY_CREATED, COMPANY_CREATE_FAILED};
use crate::model::Company;
use crate::router::Route;
use crate::table::{Filter, Row, TableState, View};
use crate::views::{company_table, CompanyColumn, Rendered, TextTable};
use crate::Result;
use serde::Serialize;
use std::fmt::Debug;

/// Creates a company and returns it as the server stored it.
pub async fn create_company(ctx: &Context, args: &CreateCompanyArgs) -> Result<Out<Company>> {
    ctx.require(Route::CreateCompany).await?;
    let payload = match CompanyForm::new(args.name(), args.description()).validate() {
        Ok(payload) => payload,
        Err(errors) => return invalid(errors),
    };
    let response = api_result(
        ctx.queries().create_company(&payload).await,
        COMPANY_CREATE_FAILED,
    )?;
    ctx.navigator().redirect(Route::ViewCompany).await;
    Ok(Out::new(response.message_or(COMPANY_CREATED), response.data))
}

pub async fn list_companies(ctx: &Context, args: &CompanyListArgs) -> Result<Out<Vec<Company>>> {
    ctx.require(Route::ViewCompany).await?;
    let companies = api_result(
        ctx.queries().companies().await,
        "Failed to load companies",
    )?;

    let mut state = table_state(&args.list);
    if let Some(search) = &args.search {
        state = state.filter(Filter::Contains {
            column: CompanyColumn::Name,
            text: search.clone(),
        });
    }
    if let Some(column) = args.sort {
        state = state.sort_by(column, args.list.direction());
    }
    let view = state.with_page(args.list.page).apply(&companies);
    let table = company_table(&view.rows);
    list_out("companies", &args.list, view, table)
}

/// An unfiltered table state with the page size the list options ask for. Filters go back to
/// the first page, so callers apply `--page` after filtering.
pub(crate) fn table_state<C: Copy + Eq>(list: &ListArgs) -> TableState<C> {
    TableState::new(list.page_size)
}

/// Renders a page of a list in the requested format.
pub(crate) fn list_out<R>(
    noun: &str,
    list: &ListArgs,
    view: View<'_, R>,
    mut table: TextTable,
) -> Result<Out<Vec<R>>>
where
    R: Row + Serialize + Clone + Debug,
{
    let rows: Vec<R> = view.rows.iter().map(|r| (*r).clone()).collect();
    if view.total == 0 {
        table.push_note(format!("No {noun} found"));
    } else {
        table.push_note(format!(
            "Page {} of {} | Total {} {noun}",
            view.page, view.page_count, view.total
        ));
    }
    let rendered = Rendered::new(list.format, &table, &rows)?;
    let message = format!("Showing {} of {} {noun}", rows.len(), view.total);
    Ok(Out::new(message, rows).with_text(rendered.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{error_type, ErrorType};
    use crate::test::TestEnv;
    use crate::views::OutputFormat;

    #[tokio::test]
    async fn test_create_company() {
        let env = TestEnv::new().await;
        let out = create_company(
            &env.context,
            &CreateCompanyArgs::new("  Coral Leasing ", ""),
        )
        .await
        .unwrap();
        let company = out.structure().unwrap();
        assert_eq!(company.company_name, "Coral Leasing");
        assert_eq!(company.company_desc, None);
        assert_eq!(out.message(), "Company created successfully");
        assert_eq!(env.context.navigator().current().await, Route::ViewCompany);

        let requests = env.server.requests().await;
        assert_eq!(
            requests[0].body,
            crate::api::Body::Json(serde_json::json!({
                "companyName": "Coral Leasing",
                "companyDesc": null
            }))
        );
    }

    #[tokio::test]
    async fn test_create_company_is_validated_first() {
        let env = TestEnv::new().await;
        let e = create_company(&env.context, &CreateCompanyArgs::new("", ""))
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert_eq!(format!("{e}"), "companyName: Company name is required");
        assert!(env.server.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_company_shows_server_message() {
        let env = TestEnv::new().await;
        let e = create_company(&env.context, &CreateCompanyArgs::new("Acme Finance", "x"))
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Server));
        assert!(format!("{e}").starts_with("Company already exists"));
    }

    #[tokio::test]
    async fn test_list_search_and_sort() {
        let env = TestEnv::new().await;
        let mut args = CompanyListArgs::default();
        args.list.page = 1;
        args.sort = Some(CompanyColumn::Id);
        args.list.desc = true;
        let out = list_companies(&env.context, &args).await.unwrap();
        let ids: Vec<u64> = out.structure().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(out.text().unwrap().contains("Total 2 companies"));

        args.search = Some("blue".into());
        args.list.format = OutputFormat::Csv;
        let out = list_companies(&env.context, &args).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
        assert!(out.text().unwrap().starts_with("ID,Company Name,Description,Created\n2,"));
        assert_eq!(env.server.count("companies").await, 1);
    }

    #[tokio::test]
    async fn test_list_requires_sign_in() {
        let env = TestEnv::signed_out().await;
        let e = list_companies(&env.context, &CompanyListArgs::default())
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Auth));
        assert!(env.server.requests().await.is_empty());
    }
}
