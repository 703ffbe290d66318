use crate::args::CashbookArgs;
use crate::commands::{api_result, Out};
use crate::context::Context;
use crate::error::{ErrorType, IntoResult};
use crate::model::CashbookParams;
use crate::router::Route;
use crate::views::{check_page_size, CashbookPage, CashbookView, OutputFormat};
use crate::Result;

/// Shows one page of the cashbook ledger for the given filters.
pub async fn cashbook(ctx: &Context, args: &CashbookArgs) -> Result<Out<CashbookPage>> {
    ctx.require(Route::Cashbook).await?;
    let page_size = args
        .page_size
        .unwrap_or_else(|| ctx.config().cashbook_page_size());
    check_page_size(page_size).pub_result(ErrorType::Validation)?;
    let params = CashbookParams {
        company_id: args.company_id,
        start_date: args.start_date,
        end_date: args.end_date,
    };

    let entries = api_result(
        ctx.queries().cashbook(&params).await,
        "Failed to load cashbook",
    )?;
    let view = CashbookView::new(&entries, page_size)?
        .with_params(params)
        .with_page(args.page)
        .print_mode(args.print);
    let page = view.page();

    let text = match args.format {
        OutputFormat::Table => view.render(),
        OutputFormat::Csv => view.table().to_csv()?,
        OutputFormat::Json => serde_json::to_string_pretty(&page)?,
    };
    let message = format!(
        "Showing {} of {} cashbook entries",
        page.entries.len(),
        page.total
    );
    Ok(Out::new(message, page).with_text(text))
}
