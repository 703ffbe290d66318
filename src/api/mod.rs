//! The REST API of the lending server.
//!
//! Requests go through the `Transport` trait. In `Mode::Live` the transport is `HttpTransport`
//! (reqwest); in `Mode::Testing` it is the in-memory `TestServer`, so the whole application can be
//! exercised without a network. `ApiClient` sits on top of either and owns the session handling.

pub mod auth;
mod client;
pub mod companies;
pub mod customers;
mod error;
mod http;
mod test_server;
pub mod transactions;

pub use client::ApiClient;
pub use error::ApiError;
pub use http::HttpTransport;
pub use test_server::{TestServer, TEST_EMAIL, TEST_PASSWORD};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Set this to a non-empty value to run against the in-memory test server.
pub const TEST_MODE_ENV: &str = "LENDBOOK_IN_TEST_MODE";

/// Selects the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Live,
    Testing,
}

impl Mode {
    /// `Mode::Testing` when `LENDBOOK_IN_TEST_MODE` is set and non-empty, `Mode::Live` otherwise.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.trim().is_empty() => Mode::Testing,
            _ => Mode::Live,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        })
    }
}

/// A part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn name(&self) -> &str {
        match self {
            Part::Text { name, .. } | Part::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<Part>),
}

/// A request as handed to a `Transport`. `path` is relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|source| ApiError::Decode {
            endpoint: self.path.clone(),
            source,
        })?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<Part>) -> Self {
        self.body = Body::Multipart(parts);
        self
    }

    /// `GET /companies` style label for logs and errors.
    pub fn endpoint(&self) -> String {
        format!("{} /{}", self.method, self.path.trim_start_matches('/'))
    }
}

/// A response before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests somewhere. Implemented over HTTP and by the in-memory test server.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError>;
}

/// The envelope every endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "yes")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

fn yes() -> bool {
    true
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default = "yes")]
    success: bool,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    data: Value,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Checks the envelope, then reads `data` as `T`. A body of the wrong shape is a
    /// `ApiError::Decode`; `success: false` is an `ApiError::Rejected`.
    pub fn parse(endpoint: &str, body: &str) -> Result<Self, ApiError> {
        let decode = |source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        };
        let envelope: Envelope = serde_json::from_str(body).map_err(decode)?;
        let message = match envelope.message {
            Some(Value::String(s)) => s,
            Some(Value::Array(items)) => items
                .into_iter()
                .find_map(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            _ => String::new(),
        };
        if !envelope.success {
            return Err(ApiError::Rejected { message });
        }
        let data = serde_json::from_value(envelope.data).map_err(decode)?;
        Ok(Self {
            success: true,
            message,
            data,
        })
    }

    /// The server's message, or `fallback` when it sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        if self.message.trim().is_empty() {
            fallback.to_string()
        } else {
            self.message.clone()
        }
    }
}
