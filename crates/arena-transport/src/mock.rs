//! A scripted, in-memory [`Transport`] for tests.
//!
//! Replies are registered per `(method, route)`; the route ignores the
//! query string. Every executed request is recorded so tests can assert on
//! exactly what went over the "wire".

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::{HttpRequest, HttpResponse, Method, Transport, TransportError};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer immediately with this status and body.
    Respond { status: u16, body: Vec<u8> },

    /// Fail as if the network were down.
    Fail(String),

    /// Answer with this status and body once `gate` is notified. Used to
    /// keep a request in flight while the test does something else.
    Held {
        gate: Arc<Notify>,
        status: u16,
        body: Vec<u8>,
    },
}

impl MockReply {
    /// A JSON reply.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::Respond {
            status,
            body: value.to_string().into_bytes(),
        }
    }

    /// A plain-text reply, the way `http.Error` answers.
    pub fn text(status: u16, text: &str) -> Self {
        Self::Respond {
            status,
            body: text.as_bytes().to_vec(),
        }
    }

    /// A raw byte reply (images).
    pub fn bytes(status: u16, body: Vec<u8>) -> Self {
        Self::Respond { status, body }
    }

    /// A network failure.
    pub fn fail(reason: &str) -> Self {
        Self::Fail(reason.to_string())
    }

    /// A JSON reply released by `gate.notify_one()`.
    pub fn held(gate: Arc<Notify>, status: u16, value: &serde_json::Value) -> Self {
        Self::Held {
            gate,
            status,
            body: value.to_string().into_bytes(),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<(Method, String), VecDeque<MockReply>>,
    requests: Vec<HttpRequest>,
}

impl MockState {
    /// Pops the next reply for the request. The last reply of a route is
    /// sticky: it keeps answering once the queue is down to one entry.
    fn next_reply(&mut self, request: &HttpRequest) -> MockReply {
        let key = (request.method, request.route().to_string());
        match self.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => {
                queue.pop_front().unwrap_or_else(|| not_found(request))
            }
            Some(queue) => queue.front().cloned().unwrap_or_else(|| not_found(request)),
            None => not_found(request),
        }
    }
}

fn not_found(request: &HttpRequest) -> MockReply {
    MockReply::text(404, &format!("no mock route for {} {}", request.method, request.route()))
}

/// Scripted transport. Clones share the same script and request log, so a
/// test can hand one clone to the client and keep another for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `reply` for `method route`. Replies are served in the order
    /// they were queued; the last one repeats.
    pub fn on(&self, method: Method, route: &str, reply: MockReply) -> &Self {
        self.lock()
            .routes
            .entry((method, route.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Drops every reply queued for `method route`.
    pub fn clear_route(&self, method: Method, route: &str) -> &Self {
        self.lock().routes.remove(&(method, route.to_string()));
        self
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// How many requests hit `method route`.
    pub fn count(&self, method: Method, route: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.route() == route)
            .count()
    }

    /// Total number of requests executed.
    pub fn total(&self) -> usize {
        self.lock().requests.len()
    }

    /// Forgets the request log, keeping the script.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

impl Transport for MockTransport {
    async fn execute(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(request.clone());
            state.next_reply(&request)
        };

        match reply {
            MockReply::Respond { status, body } => Ok(HttpResponse { status, body }),
            MockReply::Fail(reason) => Err(TransportError::ConnectionFailed(reason)),
            MockReply::Held { gate, status, body } => {
                gate.notified().await;
                Ok(HttpResponse { status, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_unrouted_request_gets_404() {
        let mock = MockTransport::new();
        let resp = mock
            .execute(HttpRequest::new(Method::Get, "/player/p1"))
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn test_replies_served_in_order_last_repeats() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/x", MockReply::text(500, "first"))
            .on(Method::Get, "/x", MockReply::text(200, "second"));

        let a = mock.execute(HttpRequest::new(Method::Get, "/x")).await.unwrap();
        let b = mock.execute(HttpRequest::new(Method::Get, "/x")).await.unwrap();
        let c = mock.execute(HttpRequest::new(Method::Get, "/x?limit=3")).await.unwrap();

        assert_eq!(a.text(), "first");
        assert_eq!(b.text(), "second");
        assert_eq!(c.text(), "second");
        assert_eq!(mock.count(Method::Get, "/x"), 3);
    }

    #[tokio::test]
    async fn test_fail_reply_is_connection_failure() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/player", MockReply::fail("offline"));

        let result = mock.execute(HttpRequest::new(Method::Post, "/player")).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(r)) if r == "offline"));
    }

    #[tokio::test]
    async fn test_held_reply_waits_for_gate() {
        let mock = MockTransport::new();
        let gate = Arc::new(Notify::new());
        mock.on(
            Method::Post,
            "/hero/h1/fight",
            MockReply::held(Arc::clone(&gate), 201, &json!({"ok": true})),
        );

        let pending = mock.execute(HttpRequest::new(Method::Post, "/hero/h1/fight"));
        tokio::pin!(pending);

        // Not released yet: a short timeout must elapse first.
        let early = tokio::time::timeout(std::time::Duration::from_millis(20), &mut pending).await;
        assert!(early.is_err(), "held reply resolved before the gate opened");

        gate.notify_one();
        let resp = pending.await.unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(mock.total(), 1, "request is logged once");
    }
}
