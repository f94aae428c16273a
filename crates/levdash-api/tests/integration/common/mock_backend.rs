//! Mock backend HTTP server for integration tests.
//!
//! Provides a simple HTTP server that can:
//! - Serve canned responses per path
//! - Record every received request (method, path, query, body)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

/// A request seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct Shared {
    responses: Mutex<HashMap<String, (u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A mock backend for testing.
pub struct MockBackend {
    addr: SocketAddr,
    shared: Arc<Shared>,
    shutdown_tx: oneshot::Sender<()>,
}

impl MockBackend {
    /// Start a new mock backend on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Shared::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new().fallback(handle).with_state(shared.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            shared,
            shutdown_tx,
        }
    }

    /// Base URL to hand to the client.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve `body` with `status` for every request to `path`.
    pub async fn respond(&self, path: &str, status: u16, body: &str) {
        self.shared
            .responses
            .lock()
            .await
            .insert(path.to_string(), (status, body.to_string()));
    }

    /// Get all received requests.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().await.clone()
    }

    /// Shutdown the server.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    shared.requests.lock().await.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body,
    });

    match shared.responses.lock().await.get(&path).cloned() {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#).into_response(),
    }
}
