//! Error handling for the crate.
//!
//! Internally everything is an `anyhow::Error`. Failures that reach the user are tagged with an
//! `ErrorType` through `IntoResult::pub_result` so that the command layer can decide how to word
//! the notification without inspecting strings.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The user-facing category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Client-side validation failed, nothing was sent.
    Validation,
    /// The credential is missing, expired or was rejected with a 401.
    Auth,
    /// The server answered with an error of its own.
    Server,
    /// Transport failure or timeout.
    Network,
    /// The server answered with a body we could not understand.
    Decode,
    /// Local configuration or file problem.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

impl From<&ApiError> for ErrorType {
    fn from(e: &ApiError) -> Self {
        match e {
            ApiError::Unauthorized { .. } => ErrorType::Auth,
            ApiError::Server { .. } | ApiError::Rejected { .. } => ErrorType::Server,
            ApiError::Timeout { .. } | ApiError::Network(_) | ApiError::InvalidUrl(_) => {
                ErrorType::Network
            }
            ApiError::Decode { .. } => ErrorType::Decode,
        }
    }
}

/// An error that has been classified with an `ErrorType`.
pub struct PubError {
    error_type: ErrorType,
    inner: Error,
}

impl PubError {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn inner(&self) -> &Error {
        &self.inner
    }
}

impl Debug for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PubError({}, {:?})", self.error_type, self.inner)
    }
}

impl Display for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for PubError {}

/// Tags an error result with an `ErrorType`. An error that already carries a type keeps it.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let inner: Error = e.into();
            if inner.downcast_ref::<PubError>().is_some() {
                inner
            } else {
                Error::new(PubError { error_type, inner })
            }
        })
    }
}

/// Finds the `ErrorType` of `e`, either from a `PubError` tag or from an `ApiError` in the chain.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    if let Some(pub_error) = e.downcast_ref::<PubError>() {
        return Some(pub_error.error_type());
    }
    api_error(e).map(ErrorType::from)
}

/// Finds the first `ApiError` in the chain of `e`, looking through `PubError` wrappers.
pub fn api_error(e: &Error) -> Option<&ApiError> {
    if let Some(pub_error) = e.downcast_ref::<PubError>() {
        return api_error(pub_error.inner());
    }
    e.chain().find_map(|cause| cause.downcast_ref::<ApiError>())
}

/// The text of the notification shown for a failed operation: the server's own message when it
/// sent one, otherwise `fallback`.
pub fn user_message(e: &Error, fallback: &str) -> String {
    match api_error(e) {
        Some(api) => api
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| match api {
                ApiError::Unauthorized { .. } => {
                    "Your session has expired, please sign in again".to_string()
                }
                _ => fallback.to_string(),
            }),
        None => match error_type(e) {
            Some(ErrorType::Validation) | Some(ErrorType::Auth) | Some(ErrorType::Config) => {
                format!("{e:#}")
            }
            _ => fallback.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_pub_result_tags_error() {
        let r: std::result::Result<(), Error> = Err(anyhow!("boom"));
        let e = r.pub_result(ErrorType::Config).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Config));
        assert_eq!(e.to_string(), "boom");
    }

    #[test]
    fn test_pub_result_keeps_first_tag() {
        let r: std::result::Result<(), Error> = Err(anyhow!("boom"));
        let e = r
            .pub_result(ErrorType::Validation)
            .pub_result(ErrorType::Network)
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
    }

    #[test]
    fn test_error_type_from_api_error_in_chain() {
        let r: std::result::Result<(), ApiError> = Err(ApiError::Server {
            status: 400,
            message: Some("Company already exists".into()),
        });
        let e = r.context("Unable to create company").unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Server));
        assert_eq!(
            user_message(&e, "Failed to create company"),
            "Company already exists"
        );
    }

    #[test]
    fn test_user_message_fallback_for_network() {
        let r: std::result::Result<(), ApiError> = Err(ApiError::Network("reset".into()));
        let e = r.pub_result(ErrorType::Network).unwrap_err();
        assert_eq!(
            user_message(&e, "Failed to load customers"),
            "Failed to load customers"
        );
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Validation.to_string(), "validation");
        assert_eq!(ErrorType::Network.to_string(), "network");
    }
}
