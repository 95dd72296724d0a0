#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use piston_client::{PistonError, RequestOptions, Transport};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Barrier;
use tokio::task::JoinHandle;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn runtime_listing() -> Value {
    json!([
        {"language": "javascript", "version": "18.15.0", "aliases": ["node-js", "js"], "runtime": "node"},
        {"language": "python", "version": "3.10.0", "aliases": ["py", "python3"]},
        {"language": "typescript", "version": "1.32.3", "aliases": ["deno-ts", "deno"], "runtime": "deno"}
    ])
}

pub fn connection_refused() -> PistonError {
    PistonError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connect ECONNREFUSED 127.0.0.1:2000",
    ))
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub body: Option<Value>,
    pub options: RequestOptions,
}

/// Transport replaying scripted responses and recording every call.
#[derive(Default)]
pub struct MockTransport {
    get_responses: Mutex<VecDeque<Result<Value, PistonError>>>,
    post_responses: Mutex<VecDeque<Result<Value, PistonError>>>,
    get_calls: AtomicUsize,
    post_calls: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Barrier>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every GET until `parties` GETs are in flight.
    pub fn gated(parties: usize) -> Self {
        Self {
            gate: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn push_get(self, response: Result<Value, PistonError>) -> Self {
        self.get_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn push_post(self, response: Result<Value, PistonError>) -> Self {
        self.post_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn unscripted() -> PistonError {
        PistonError::Io(std::io::Error::new(std::io::ErrorKind::Other, "no scripted response"))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Value, PistonError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            body: None,
            options: options.clone(),
        });
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.get_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn post(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Value, PistonError> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            body: Some(body.clone()),
            options: options.clone(),
        });
        self.post_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted()))
    }
}

#[derive(Debug, Clone)]
pub struct ServerRequest {
    pub method: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct MockServerState {
    runtimes_body: Arc<String>,
    requests: Arc<Mutex<Vec<ServerRequest>>>,
}

impl MockServerState {
    fn record(&self, method: &str, headers: &HeaderMap, body: String) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(ServerRequest {
            method: method.to_string(),
            content_type,
            body,
        });
    }
}

async fn runtimes_handler(State(state): State<MockServerState>, headers: HeaderMap) -> Response {
    state.record("GET", &headers, String::new());
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.runtimes_body.as_str().to_string(),
    )
        .into_response()
}

async fn execute_handler(State(state): State<MockServerState>, headers: HeaderMap, body: String) -> Response {
    state.record("POST", &headers, body.clone());

    let request: Value = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, axum::Json(json!({"message": "invalid body"}))).into_response();
        }
    };
    let language = request["language"].as_str().unwrap_or_default().to_string();
    if language == "cobol" {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"message": "cobol-* runtime is unknown"})),
        )
            .into_response();
    }

    let stdout = request["args"]
        .as_array()
        .map(|args| {
            args.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    axum::Json(json!({
        "run": {
            "stdout": format!("{}\n", stdout),
            "stderr": "",
            "code": 0,
            "signal": null,
            "output": format!("{}\n", stdout)
        },
        "language": language,
        "version": "18.15.0"
    }))
    .into_response()
}

/// Piston look-alike serving `/api/v2/runtimes` and `/api/v2/execute`.
pub struct MockPistonServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    requests: Arc<Mutex<Vec<ServerRequest>>>,
}

impl MockPistonServer {
    pub async fn start() -> Self {
        Self::start_with_runtimes(runtime_listing().to_string()).await
    }

    /// Serve `runtimes_body` verbatim from the runtimes endpoint.
    pub async fn start_with_runtimes(runtimes_body: String) -> Self {
        let state = MockServerState {
            runtimes_body: Arc::new(runtimes_body),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/api/v2/runtimes", get(runtimes_handler))
            .route("/api/v2/execute", post(execute_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("Failed to bind mock Piston server: {}", e));
        let addr = listener.local_addr().unwrap();
        log::info!("Mock Piston server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| log::error!("Mock Piston server error: {}", e));
        });

        Self {
            addr,
            shutdown_tx,
            requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<ServerRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock Piston server already stopped");
        }
    }
}

/// Read one request head from `stream`, answer with `response` verbatim and
/// close. Returns the request head as received.
pub async fn answer_once<S>(mut stream: S, response: &[u8]) -> String
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request: Vec<u8> = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    stream.write_all(response).await.unwrap();
    stream.shutdown().await.unwrap();
    String::from_utf8_lossy(&request).into_owned()
}

/// Accept a single plain TCP connection on `listener` and answer it with `response`.
pub fn serve_once(listener: TcpListener, response: &'static [u8]) -> JoinHandle<String> {
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        answer_once(stream, response).await
    })
}
