use crate::commands::{api_result, Out};
use crate::context::Context;
use crate::model::{PartyRole, Slip};
use crate::router::Route;
use crate::views::SlipDocument;
use crate::Result;

/// Loads the printable slip of a transaction for its lenders or its borrowers. The slip is dated
/// today.
pub async fn slip(ctx: &Context, id: u64, role: PartyRole) -> Result<Out<Slip>> {
    ctx.require(Route::ViewSlip { id, role }).await?;
    let slip = api_result(ctx.queries().slip(id, role).await, "Failed to load slip")?;
    let today = chrono::Local::now().date_naive();
    let document = SlipDocument::new(&slip, role, today);
    let text = document.render();
    let message = format!("{} for transaction {id}", document.title());
    Ok(Out::new(message, slip).with_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_borrower_slip() {
        let env = TestEnv::new().await;
        let out = slip(&env.context, 2, PartyRole::Borrower).await.unwrap();
        assert_eq!(out.message(), "BORROWER SLIP for transaction 2");
        let slip = out.structure().unwrap();
        assert_eq!(slip.rows.len(), 2);

        let text = out.text().unwrap();
        assert!(text.starts_with("BORROWER SLIP"));
        assert!(text.contains("RAVI KUMAR (borrower)"));
        assert!(text.contains("A TOTAL"));
        assert_eq!(
            env.context.navigator().current().await,
            Route::ViewSlip {
                id: 2,
                role: PartyRole::Borrower
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let env = TestEnv::new().await;
        let e = slip(&env.context, 99, PartyRole::Lender).await.unwrap_err();
        assert!(format!("{e}").starts_with("Transaction not found"));
    }
}
