//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;

/// Timeout applied to every provider call unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends provider calls over HTTP with JSON bodies.
///
/// Each call is bounded by the client timeout; there is no wider deadline.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = request.method.clone();
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(ACCEPT, "application/json");

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(TransportError::from_reqwest)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(TransportError::from_reqwest)?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        tracing::debug!(%method, url = %request.url, status, "provider responded");
        Ok(TransportResponse { status, body })
    }
}
