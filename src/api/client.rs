use crate::api::error::error_message;
use crate::api::{ApiError, ApiRequest, ApiResponse, Transport};
use crate::router::{Navigator, Route};
use crate::session::Session;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends requests with the stored credential and interprets the answers.
///
/// A 401 from any endpoint clears the session and sends the navigator to `/signin` before the
/// error is returned. Every other failure is returned unchanged.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Session,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Session, navigator: Navigator) -> Self {
        Self {
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sends `request` and reads the `data` of the answer as `T`.
    pub async fn send<T>(&self, mut request: ApiRequest) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let endpoint = request.endpoint();
        request.bearer = self.session.token().await;
        debug!(
            "Sending {endpoint}{}",
            if request.bearer.is_some() {
                ""
            } else {
                " without a credential"
            }
        );

        let response = self.transport.send(&request).await?;

        if response.status == 401 {
            warn!("{endpoint} answered 401, signing out");
            if let Err(e) = self.session.clear().await {
                warn!("Unable to clear the stored credential: {e:#}");
            }
            self.navigator.redirect(Route::SignIn).await;
            return Err(ApiError::Unauthorized {
                message: error_message(&response.body),
            });
        }

        if !response.is_success() {
            return Err(ApiError::Server {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        ApiResponse::parse(&endpoint, &response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawResponse, TestServer};
    use crate::session::{encode_token, Claims};
    use serde::de::IgnoredAny;
    use tempfile::TempDir;

    async fn signed_in(dir: &TempDir) -> Session {
        let session = Session::load(dir.path().join("token.json")).await.unwrap();
        let token = encode_token(&Claims {
            sub: 1,
            email: "a@b.c".into(),
            iat: 0,
            exp: i64::MAX / 2,
        });
        session.store(&token).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_bearer_is_attached() {
        let dir = TempDir::new().unwrap();
        let session = signed_in(&dir).await;
        let server = Arc::new(TestServer::new());
        let client = ApiClient::new(server.clone(), session.clone(), Navigator::default());

        let _: ApiResponse<IgnoredAny> = client.send(ApiRequest::get("companies")).await.unwrap();
        let log = server.requests().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].bearer, session.token().await);
    }

    #[tokio::test]
    async fn test_401_clears_session_and_redirects() {
        let dir = TempDir::new().unwrap();
        let session = signed_in(&dir).await;
        let server = Arc::new(TestServer::new());
        server
            .force_next(RawResponse::new(401, r#"{"message":"jwt expired"}"#))
            .await;
        let navigator = Navigator::new(Route::ViewCompany);
        let client = ApiClient::new(server.clone(), session.clone(), navigator.clone());

        let e = client
            .send::<IgnoredAny>(ApiRequest::get("companies"))
            .await
            .unwrap_err();
        assert!(e.is_unauthorized());
        assert_eq!(e.server_message(), Some("jwt expired"));
        assert!(session.token().await.is_none());
        assert!(!session.path().exists());
        assert_eq!(navigator.current().await, Route::SignIn);
    }

    #[tokio::test]
    async fn test_server_error_keeps_session() {
        let dir = TempDir::new().unwrap();
        let session = signed_in(&dir).await;
        let server = Arc::new(TestServer::new());
        server
            .force_next(RawResponse::new(500, r#"{"message":"Database unavailable"}"#))
            .await;
        let client = ApiClient::new(server, session.clone(), Navigator::default());

        let e = client
            .send::<IgnoredAny>(ApiRequest::get("customers"))
            .await
            .unwrap_err();
        assert!(matches!(e, ApiError::Server { status: 500, .. }));
        assert_eq!(e.server_message(), Some("Database unavailable"));
        assert!(session.is_signed_in().await);
    }
}
