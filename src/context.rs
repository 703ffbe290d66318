//! The objects that live for the length of one application session.
//!
//! `Context` is built once at start-up from the `Config` and the `Mode`. It owns the session, the
//! navigator and the query cache, and hands out cheap clones of them to the commands.

use crate::api::{ApiClient, HttpTransport, Mode, TestServer, Transport};
use crate::error::{ErrorType, IntoResult};
use crate::queries::Queries;
use crate::router::{Navigator, Route};
use crate::session::Session;
use crate::{Config, Result};
use anyhow::{anyhow, Context as _};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Context {
    config: Config,
    session: Session,
    navigator: Navigator,
    queries: Queries,
}

impl Context {
    /// Loads the stored credential and connects to the API, or to the in-memory test server in
    /// `Mode::Testing`.
    pub async fn new(config: Config, mode: Mode) -> Result<Self> {
        let transport: Arc<dyn Transport> = match mode {
            Mode::Live => Arc::new(
                HttpTransport::new(config.api_url().clone(), config.timeout())
                    .context("Unable to create the HTTP client")
                    .pub_result(ErrorType::Config)?,
            ),
            Mode::Testing => {
                debug!("Using the in-memory test server");
                Arc::new(TestServer::new())
            }
        };
        Self::with_transport(config, transport).await
    }

    pub async fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let session = Session::load(config.credential_path())
            .await
            .pub_result(ErrorType::Config)?;
        let start = if session.is_signed_in().await {
            Route::Dashboard
        } else {
            Route::SignIn
        };
        let navigator = Navigator::new(start);
        let client = ApiClient::new(transport, session.clone(), navigator.clone());
        Ok(Self {
            config,
            session,
            navigator,
            queries: Queries::new(client),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    /// Enters `route`. Fails with an `Auth` error when the route needs a credential that the
    /// session does not have.
    pub async fn require(&self, route: Route) -> Result<()> {
        let entered = self.navigator.navigate(route.clone(), &self.session).await;
        if entered != route {
            return Err(anyhow!(
                "You are not signed in, run 'lendbook login' before opening {route}"
            ))
            .pub_result(ErrorType::Auth);
        }
        Ok(())
    }

    /// Signs out: removes the stored credential, drops every cached query and returns to sign-in.
    pub async fn teardown(&self) -> Result<()> {
        self.session.clear().await.pub_result(ErrorType::Config)?;
        self.queries.clear().await;
        self.navigator.redirect(Route::SignIn).await;
        Ok(())
    }
}
