use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, Uri},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use axum::http::StatusCode;

/// A recognition as the scnnr API reports it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Recognition {
    pub id: String,
    pub objects: Vec<serde_json::Value>,
    pub state: String,
}

impl Recognition {
    pub fn queued() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            objects: Vec::new(),
            state: "queued".to_string(),
        }
    }
}

/// The canned answer given to every request.
#[derive(Clone, Debug)]
pub struct Stub {
    pub status: StatusCode,
    pub body: String,
}

impl Stub {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

impl Default for Stub {
    fn default() -> Self {
        let body = serde_json::to_string(&Recognition::queued()).unwrap_or_default();
        Self::ok(body)
    }
}

/// A request as it arrived on the wire.
#[derive(Clone, Debug, Serialize)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Header value by name. Names compare case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Shared record of every request the stub has answered, oldest first.
#[derive(Clone, Debug, Default)]
pub struct Log(Arc<RwLock<Vec<RecordedRequest>>>);

impl Log {
    pub async fn snapshot(&self) -> Vec<RecordedRequest> {
        self.0.read().await.clone()
    }

    /// Must not be called from inside a tokio runtime.
    pub fn blocking_snapshot(&self) -> Vec<RecordedRequest> {
        self.0.blocking_read().clone()
    }

    pub fn blocking_clear(&self) {
        self.0.blocking_write().clear();
    }

    async fn push(&self, request: RecordedRequest) {
        self.0.write().await.push(request);
    }
}

#[derive(Clone)]
struct AppState {
    stub: Stub,
    log: Log,
}

pub fn app(stub: Stub, log: Log) -> Router {
    Router::new()
        .fallback(record)
        .with_state(AppState { stub, log })
}

pub async fn run(listener: TcpListener, stub: Stub, log: Log) -> Result<(), std::io::Error> {
    axum::serve(listener, app(stub, log)).await
}

async fn record(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: body.to_vec(),
    };
    tracing::debug!(
        method = %request.method,
        path = %request.path,
        body_len = request.body.len(),
        "recorded request"
    );
    state.log.push(request).await;
    (
        state.stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.stub.body.clone(),
    )
}

/// A stub server running on its own thread, for blocking clients in tests.
pub struct StubServer {
    addr: SocketAddr,
    log: Log,
}

impl StubServer {
    /// Bind a random local port and serve `stub` until the process exits.
    pub fn start(stub: Stub) -> Result<Self, std::io::Error> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let log = Log::default();
        let server_log = log.clone();

        std::thread::spawn(move || {
            let result = runtime.block_on(async move {
                let listener = TcpListener::from_std(std_listener)?;
                run(listener, stub, server_log).await
            });
            if let Err(err) = result {
                tracing::error!(%err, "stub server stopped");
            }
        });

        Ok(Self { addr, log })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.blocking_snapshot()
    }

    pub fn clear(&self) {
        self.log.blocking_clear();
    }
}
