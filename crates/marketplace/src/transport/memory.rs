//! In-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::Value;

use super::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(TransportResponse),
    Fault(String),
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    routes: HashMap<(Method, String), VecDeque<Scripted>>,
    calls: Vec<TransportRequest>,
}

/// Scripted transport that records every call.
///
/// Responses are scripted per method and URL path and consumed in order;
/// the last scripted entry for a route keeps repeating. Calls to a route
/// with no script fail as unreachable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<RwLock<InMemoryTransportState>>,
}

impl InMemoryTransport {
    /// Creates a new in-memory transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Scripted::Respond(TransportResponse::new(status, body)));
    }

    /// Queues a transport fault for `method path`.
    pub fn fail(&self, method: Method, path: &str, reason: &str) {
        self.push(method, path, Scripted::Fault(reason.to_string()));
    }

    /// Returns every request sent so far, oldest first.
    pub fn calls(&self) -> Vec<TransportRequest> {
        self.state.read().unwrap().calls.clone()
    }

    /// Returns the number of requests sent to `path`, any method.
    pub fn call_count(&self, path: &str) -> usize {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|call| path_of(&call.url) == path)
            .count()
    }

    /// Returns the total number of requests sent.
    pub fn total_calls(&self) -> usize {
        self.state.read().unwrap().calls.len()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.state
            .write()
            .unwrap()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }
}

fn path_of(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut state = self.state.write().unwrap();
        let key = (request.method.clone(), path_of(&request.url));
        state.calls.push(request);

        let scripted = match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fault(reason)) => Err(TransportError::Unreachable(reason)),
            None => Err(TransportError::Unreachable(format!(
                "no route scripted for {} {}",
                key.0, key.1
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_responses_in_order_then_repeat() {
        let transport = InMemoryTransport::new();
        transport.respond(Method::POST, "/inventory", 500, Value::Null);
        transport.respond(Method::POST, "/inventory", 200, json!({ "inventory_id": "67890" }));

        let send = || transport.send(TransportRequest::post("http://provider-b.test/inventory"));

        assert_eq!(send().await.unwrap().status, 500);
        assert_eq!(send().await.unwrap().status, 200);
        assert_eq!(send().await.unwrap().status, 200);
        assert_eq!(transport.call_count("/inventory"), 3);
    }

    #[tokio::test]
    async fn test_scripted_fault() {
        let transport = InMemoryTransport::new();
        transport.fail(Method::POST, "/api/products", "connection refused");

        let result = transport
            .send(TransportRequest::post("http://provider-a.test/api/products"))
            .await;

        assert!(matches!(result, Err(TransportError::Unreachable(reason)) if reason == "connection refused"));
    }

    #[tokio::test]
    async fn test_unscripted_route_is_unreachable() {
        let transport = InMemoryTransport::new();

        let result = transport
            .send(TransportRequest::post("http://provider-a.test/unknown"))
            .await;

        assert!(result.is_err());
        assert_eq!(transport.total_calls(), 1);
        assert_eq!(transport.calls()[0].url, "http://provider-a.test/unknown");
    }
}
