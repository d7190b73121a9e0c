//! Integration tests for Restock.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p restock-integration-tests
//! ```
//!
//! # Mock Backend
//!
//! [`MockBackend`] serves the three waitlist endpoints from an in-process
//! axum server on `127.0.0.1:0`. Tests script responses per endpoint and
//! inspect the requests that arrived:
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await;
//! backend.respond(Endpoint::Join, 200, json!({"success": true}));
//!
//! let client = backend.client(None);
//! // ... drive the client ...
//!
//! let request = backend.requests().pop().unwrap();
//! assert_eq!(request.authorization, None);
//! ```

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use restock_waitlist::{HttpTransport, WaitlistClient, WaitlistConfig};
use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Shop domain every [`MockBackend::client`] is configured with.
pub const SHOP_DOMAIN: &str = "restock-test.myshopify.com";

/// Waitlist service endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Join,
    Leave,
    Count,
}

/// A request the backend received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: Endpoint,
    /// Path parameter of the count endpoint.
    pub variant_id: Option<String>,
    /// Raw query string, still percent-encoded.
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

struct Scripted {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

#[derive(Default)]
struct BackendState {
    requests: Mutex<Vec<RecordedRequest>>,
    script: Mutex<HashMap<Endpoint, VecDeque<Scripted>>>,
}

impl BackendState {
    async fn handle(&self, request: RecordedRequest) -> Response {
        let endpoint = request.endpoint;
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);

        let Some(scripted) = next else {
            return (StatusCode::INTERNAL_SERVER_ERROR, "unscripted request").into_response();
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        (
            scripted.status,
            [(header::CONTENT_TYPE, "application/json")],
            scripted.body,
        )
            .into_response()
    }
}

/// In-process waitlist service.
///
/// The server task is aborted when the backend is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());

        let app = Router::new()
            .route("/api/v1/join", post(join))
            .route("/api/v1/leave", post(leave))
            .route("/api/v1/count/{id}", get(count))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock backend address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend stopped");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL to configure clients with.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Never in practice: the URL and shop are always valid.
    #[must_use]
    pub fn config(&self, api_key: Option<&str>) -> WaitlistConfig {
        WaitlistConfig::new(&self.url(), SHOP_DOMAIN, api_key.map(SecretString::from))
            .expect("Mock backend configuration is valid")
    }

    /// Client over the real HTTP transport.
    #[must_use]
    pub fn client(&self, api_key: Option<&str>) -> WaitlistClient {
        WaitlistClient::new(self.config(api_key))
    }

    /// Client whose HTTP transport gives up after `timeout`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client_with_timeout(&self, timeout: Duration) -> WaitlistClient {
        let transport =
            HttpTransport::with_timeout(timeout).expect("Failed to build HTTP transport");
        WaitlistClient::with_transport(self.config(None), Arc::new(transport))
    }

    /// Queue a JSON response for `endpoint`.
    pub fn respond(&self, endpoint: Endpoint, status: u16, body: serde_json::Value) {
        self.push(endpoint, status, body.to_string(), None);
    }

    /// Queue a raw response body for `endpoint`.
    pub fn respond_raw(&self, endpoint: Endpoint, status: u16, body: &str) {
        self.push(endpoint, status, body.to_string(), None);
    }

    /// Queue a JSON response that is sent only after `delay`.
    pub fn respond_after(
        &self,
        endpoint: Endpoint,
        delay: Duration,
        status: u16,
        body: serde_json::Value,
    ) {
        self.push(endpoint, status, body.to_string(), Some(delay));
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for `endpoint`.
    #[must_use]
    pub fn request_count(&self, endpoint: Endpoint) -> usize {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }

    fn push(&self, endpoint: Endpoint, status: u16, body: String, delay: Option<Duration>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.state
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(endpoint)
            .or_default()
            .push_back(Scripted {
                status,
                body,
                delay,
            });
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Serve one connection whose reply is cut short.
///
/// The reply announces `status` and a 100-byte JSON body, sends only a few
/// bytes of it and closes. Returns the base URL.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn serve_truncated_once(status: u16) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind truncating server");
    let addr = listener
        .local_addr()
        .expect("Failed to read truncating server address");

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            read_request(&mut stream).await;
            let reply = format!(
                "HTTP/1.1 {status} Whatever\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: 100\r\n\r\n{{\"err"
            );
            let _ = stream.write_all(reply.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{addr}")
}

/// Consume request headers and any `Content-Length` body.
async fn read_request(stream: &mut TcpStream) {
    let mut received = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        received.extend_from_slice(chunk.get(..n).unwrap_or_default());

        let text = String::from_utf8_lossy(&received);
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text
            .get(..header_end)
            .unwrap_or_default()
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if received.len() >= header_end + 4 + content_length {
            return;
        }
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn join(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state
        .handle(RecordedRequest {
            endpoint: Endpoint::Join,
            variant_id: None,
            query: None,
            authorization: authorization(&headers),
            body: serde_json::from_str(&body).ok(),
        })
        .await
}

async fn leave(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state
        .handle(RecordedRequest {
            endpoint: Endpoint::Leave,
            variant_id: None,
            query: None,
            authorization: authorization(&headers),
            body: serde_json::from_str(&body).ok(),
        })
        .await
}

async fn count(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    state
        .handle(RecordedRequest {
            endpoint: Endpoint::Count,
            variant_id: Some(id),
            query,
            authorization: authorization(&headers),
            body: None,
        })
        .await
}
