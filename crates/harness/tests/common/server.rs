//! Local HTTP servers for executor tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A running echo server.
pub struct EchoServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl EchoServer {
    /// Number of requests the server has handled.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server under `/api` that reflects each request back as JSON.
///
/// - `/api/echo` returns `{method, query, contentType, referer, body}`
/// - `/api/status/{code}` answers with that status and a JSON body
/// - `/api/text` answers with a plain-text body
pub async fn spawn_echo_server() -> EchoServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/echo", any(echo))
        .route("/api/status/{code}", any(status))
        .route("/api/text", get(text))
        .with_state(Arc::clone(&hits));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind echo server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    EchoServer {
        base_url: format!("http://{}/api", addr),
        hits,
    }
}

async fn echo(
    State(hits): State<Arc<AtomicUsize>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "query": uri.query(),
        "contentType": header("content-type"),
        "referer": header("referer"),
        "body": body,
    }))
}

async fn status(State(hits): State<Arc<AtomicUsize>>, Path(code): Path<u16>) -> impl IntoResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::IM_A_TEAPOT);
    (status, Json(json!({ "responseCode": code, "message": "status echo" })))
}

async fn text(State(hits): State<Arc<AtomicUsize>>) -> &'static str {
    hits.fetch_add(1, Ordering::SeqCst);
    "<html>maintenance</html>"
}

/// A base URL on a port nothing listens on.
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("http://{}/api", addr)
}

/// Starts a raw server that drops the first `failures` connections without
/// answering, then replies `200` with `body` to every later one.
pub async fn spawn_flaky_server(failures: usize, body: Value) -> EchoServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind flaky server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let counter = Arc::clone(&hits);
    let payload = body.to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let seen = counter.fetch_add(1, Ordering::SeqCst);
            if seen < failures {
                drop(stream);
                continue;
            }
            let payload = payload.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    payload.len(),
                    payload
                );
                stream.write_all(response.as_bytes()).await.ok();
                stream.shutdown().await.ok();
            });
        }
    });

    EchoServer {
        base_url: format!("http://{}/api", addr),
        hits,
    }
}
