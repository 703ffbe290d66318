//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::TestServer;
use crate::context::Context;
use crate::queries::Queries;
use crate::session::Session;
use crate::Config;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment with a lendbook home directory, a seeded `TestServer` and a `Context` that
/// talks to it. Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    pub server: Arc<TestServer>,
    pub context: Context,
}

impl TestEnv {
    /// Creates a test environment that is signed in as the test user.
    pub async fn new() -> Self {
        Self::create(true).await
    }

    /// Creates a test environment without a stored credential.
    pub async fn signed_out() -> Self {
        Self::create(false).await
    }

    async fn create(signed_in: bool) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("lendbook");

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let api_url = format!("https://{rand}.lending.example.com/api");
        let config = Config::create(&root, &api_url).await.unwrap();

        if signed_in {
            let session = Session::load(config.credential_path()).await.unwrap();
            session.store(&TestServer::token()).await.unwrap();
        }

        let server = Arc::new(TestServer::new());
        let context = Context::with_transport(config, server.clone())
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            server,
            context,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.context.config().clone()
    }

    pub fn queries(&self) -> &Queries {
        self.context.queries()
    }
}
