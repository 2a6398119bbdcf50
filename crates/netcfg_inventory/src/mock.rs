//! Mock transport for testing.
//!
//! Provides a scripted implementation of the [`InventoryTransport`] trait so
//! client, pagination, and resolver logic can be exercised without a live
//! inventory instance.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::error::{InventoryError, InventoryResult};
use crate::transport::{InventoryTransport, QueryParams, RawResponse};

/// Captured request information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub path: String,
    pub params: QueryParams,
}

impl CapturedRequest {
    /// Value of the first query parameter named `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// How the mock answers requests for one path.
#[derive(Clone)]
enum Route {
    /// Responses handed out in order; the last one repeats.
    Scripted(Arc<RwLock<VecDeque<RawResponse>>>),
    /// Paginated list endpoint honouring `limit` and `offset`.
    Listing(Arc<Vec<Value>>),
}

/// A response served only when a query parameter has a given value.
#[derive(Clone)]
struct Conditional {
    path: String,
    param: String,
    value: String,
    response: RawResponse,
}

/// Mock inventory transport.
///
/// Captures every request and answers from per-path routes. Conditional
/// routes are checked first. Unknown paths answer 404.
///
/// With [`MockTransport::with_latency`] every request stays in flight for
/// the given time, and [`MockTransport::peak_in_flight`] reports how many
/// requests were outstanding at once.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<RwLock<HashMap<String, Route>>>,
    conditionals: Arc<RwLock<Vec<Conditional>>>,
    captured: Arc<RwLock<Vec<CapturedRequest>>>,
    request_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    latency: Duration,
}

impl MockTransport {
    /// Create a mock with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `path`. Queued responses are returned in
    /// order and the last one is repeated once the queue drains.
    pub fn respond(self, path: &str, response: RawResponse) -> Self {
        {
            let mut routes = self.routes.write();
            let existing = match routes.get(path) {
                Some(Route::Scripted(queue)) => Some(Arc::clone(queue)),
                _ => None,
            };
            match existing {
                Some(queue) => queue.write().push_back(response),
                None => {
                    let queue = VecDeque::from([response]);
                    routes.insert(
                        path.to_string(),
                        Route::Scripted(Arc::new(RwLock::new(queue))),
                    );
                }
            }
        }
        self
    }

    /// Queue a 200 response carrying `body` as JSON.
    pub fn respond_json(self, path: &str, body: Value) -> Self {
        self.respond(path, RawResponse::new(200, body.to_string()))
    }

    /// Serve `records` from `path` as a paginated `{count, results}` listing.
    pub fn listing(self, path: &str, records: Vec<Value>) -> Self {
        self.routes
            .write()
            .insert(path.to_string(), Route::Listing(Arc::new(records)));
        self
    }

    /// Answer `path` with `response` whenever query parameter `param`
    /// equals `value`.
    pub fn respond_when(self, path: &str, param: &str, value: &str, response: RawResponse) -> Self {
        self.conditionals.write().push(Conditional {
            path: path.to_string(),
            param: param.to_string(),
            value: value.to_string(),
            response,
        });
        self
    }

    /// Hold every request for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Highest number of requests that were in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Captured requests for one path.
    pub fn requests_for(&self, path: &str) -> Vec<CapturedRequest> {
        self.captured
            .read()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Total number of requests served.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn answer(&self, path: &str, params: &QueryParams) -> InventoryResult<RawResponse> {
        let conditional = self
            .conditionals
            .read()
            .iter()
            .find(|c| {
                c.path == path && params.iter().any(|(k, v)| *k == c.param && *v == c.value)
            })
            .map(|c| c.response.clone());
        if let Some(response) = conditional {
            return Ok(response);
        }

        let route = self.routes.read().get(path).cloned();
        match route {
            Some(Route::Scripted(queue)) => {
                let mut queue = queue.write();
                let response = if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
                Ok(response.unwrap_or_else(|| RawResponse::new(404, "")))
            }
            Some(Route::Listing(records)) => Self::page(&records, params),
            None => Ok(RawResponse::new(404, r#"{"detail":"Not found."}"#)),
        }
    }

    fn page(records: &[Value], params: &QueryParams) -> InventoryResult<RawResponse> {
        let number = |name: &str, default: usize| -> InventoryResult<usize> {
            match params.iter().find(|(k, _)| k == name) {
                Some((_, v)) => v.parse().map_err(|_| InventoryError::UnexpectedResponse {
                    path: "mock".to_string(),
                    message: format!("bad {} parameter: {}", name, v),
                }),
                None => Ok(default),
            }
        };

        let offset = number("offset", 0)?;
        let limit = match number("limit", 0)? {
            0 => records.len(),
            n => n,
        };

        let results: Vec<Value> = records.iter().skip(offset).take(limit).cloned().collect();
        let body = json!({ "count": records.len(), "results": results });
        Ok(RawResponse::new(200, body.to_string()))
    }
}

#[async_trait]
impl InventoryTransport for MockTransport {
    async fn get(&self, path: &str, params: &QueryParams) -> InventoryResult<RawResponse> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.captured.write().push(CapturedRequest {
            path: path.to_string(),
            params: params.clone(),
        });

        let outstanding = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(outstanding, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let response = self.answer(path, params);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
