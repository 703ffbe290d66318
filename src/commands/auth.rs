//! Sign-in, sign-out and the identity of the stored credential.

use crate::api;
use crate::args::LoginArgs;
use crate::commands::{api_result, invalid, Out};
use crate::context::Context;
use crate::error::{ErrorType, IntoResult};
use crate::forms::{SignInForm, SIGN_IN_FAILED};
use crate::router::Route;
use crate::session::Claims;
use crate::Result;
use anyhow::anyhow;

/// Handles `lendbook login`. The returned token is stored for one day and the dashboard becomes
/// the current page.
pub async fn login(ctx: &Context, args: &LoginArgs) -> Result<Out<Claims>> {
    ctx.navigator().redirect(Route::SignIn).await;
    let request = match SignInForm::new(args.email(), args.password()).validate() {
        Ok(request) => request,
        Err(errors) => return invalid(errors),
    };

    let response = api_result(
        api::auth::login(ctx.queries().client(), &request).await,
        SIGN_IN_FAILED,
    )?;
    ctx.session()
        .store(&response.data.access_token)
        .await
        .pub_result(ErrorType::Config)?;
    // a different account must not see the previous one's cached lists
    ctx.queries().clear().await;

    let claims = ctx
        .session()
        .claims()
        .await
        .ok_or_else(|| anyhow!("The server returned an access token that cannot be decoded"))
        .pub_result(ErrorType::Auth)?;
    ctx.navigator().navigate(Route::Dashboard, ctx.session()).await;
    Ok(Out::new(format!("Signed in as {}", claims.email), claims))
}

/// Handles `lendbook logout`.
pub async fn logout(ctx: &Context) -> Result<Out<()>> {
    ctx.teardown().await?;
    Ok("Signed out".into())
}

/// Handles `lendbook whoami`. The claims are read from the token without checking its signature.
pub async fn whoami(ctx: &Context) -> Result<Out<Claims>> {
    let claims = ctx
        .session()
        .claims()
        .await
        .ok_or_else(|| anyhow!("You are not signed in, run 'lendbook login'"))
        .pub_result(ErrorType::Auth)?;
    let expires = claims
        .expires_at()
        .map(|t| t.format("%d/%m/%Y %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let text = format!(
        "User ID  {}\nEmail    {}\nExpires  {expires}",
        claims.sub, claims.email
    );
    Ok(Out::new(format!("Signed in as {}", claims.email), claims).with_text(text))
}
