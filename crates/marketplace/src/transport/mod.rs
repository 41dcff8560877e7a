//! HTTP-like transport seam used by provider clients.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::TransportError;

pub use http::HttpTransport;
pub use memory::InMemoryTransport;

/// An outbound provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A provider's answer. Bodies that are empty or not JSON read as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Providers signal success with 200 or 201 only.
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// Reads an identifier from the body, accepting JSON strings and numbers.
    pub fn id_field(&self, field: &str) -> Option<String> {
        match self.body.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Sends one request and returns the provider's answer.
///
/// Implementations manage their own connections and timeouts. A returned
/// `Err` means no response was observed at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
