use std::time::Duration;
use thiserror::Error;

/// Failures of a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401. The stored credential has already been cleared.
    #[error("Unauthorized{}", suffix(.message))]
    Unauthorized { message: Option<String> },

    /// The server answered with a non-success status.
    #[error("The server answered {status}{}", suffix(.message))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// The server answered 2xx but with `success: false`.
    #[error("The server rejected the request: {message}")]
    Rejected { message: String },

    #[error("The request timed out after {}s", .timeout.as_secs())]
    Timeout { timeout: Duration },

    #[error("Unable to reach the server: {0}")]
    Network(String),

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

fn suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

impl ApiError {
    /// The message written by the server, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Server { message, .. } => {
                message.as_deref()
            }
            ApiError::Rejected { message } => Some(message.as_str()).filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    /// Whether a read may be tried again. A 401 never is.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::InvalidUrl(_)
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Pulls the human readable message out of an error body. Validation failures send a list in
/// `errors` or `message`; the first entry is used.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let first = |v: &serde_json::Value| -> Option<String> {
        match v {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => items.iter().find_map(|i| match i {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                _ => None,
            }),
            _ => None,
        }
    };
    value
        .get("errors")
        .and_then(first)
        .or_else(|| value.get("message").and_then(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"success":false,"message":"Email already exists"}"#).as_deref(),
            Some("Email already exists")
        );
        assert_eq!(
            error_message(r#"{"message":["mobileNumber must be a string","x"]}"#).as_deref(),
            Some("mobileNumber must be a string")
        );
        assert_eq!(
            error_message(r#"{"errors":["PAN is invalid"],"message":"Bad Request"}"#).as_deref(),
            Some("PAN is invalid")
        );
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"message":""}"#), None);
    }

    #[test]
    fn test_display() {
        let e = ApiError::Server {
            status: 409,
            message: Some("Duplicate".into()),
        };
        assert_eq!(e.to_string(), "The server answered 409: Duplicate");
        let e = ApiError::Timeout {
            timeout: Duration::from_secs(15),
        };
        assert_eq!(e.to_string(), "The request timed out after 15s");
        assert!(e.is_retryable());
        assert!(!ApiError::Unauthorized { message: None }.is_retryable());
    }
}
