//! Shared test harness: a mock Wizarr server with request counters and
//! failure switches, plus an embedded SMTP server that captures emails.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The API key every test client is expected to present.
pub const API_KEY: &str = "test-key";

fn check_key(headers: &HeaderMap) -> Result<(), StatusCode> {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY) {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Default)]
pub struct MockState {
    /// Successful GET round-trips across all six polled endpoints.
    pub endpoint_hits: AtomicUsize,
    pub invitation_posts: AtomicUsize,
    pub fail_refresh: AtomicBool,
    pub omit_invitation_url: AtomicBool,
    pub delay_ms: AtomicU64,
    pub last_invitation_body: Mutex<Option<Value>>,
}

impl MockState {
    async fn answer(&self, headers: &HeaderMap, payload: Value) -> Result<Json<Value>, StatusCode> {
        check_key(headers)?;
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        self.endpoint_hits.fetch_add(1, Ordering::SeqCst);
        Ok(Json(payload))
    }
}

async fn status(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state
        .answer(&headers, json!({"version": "2.2.1", "total_users": 3}))
        .await
}

async fn users(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state
        .answer(
            &headers,
            json!({"data": [
                {"id": 1, "username": "alice", "server_type": "plex"},
                {"id": 2, "username": "bob", "server_type": "plex"},
                {"id": 3, "username": "carol", "server_type": "emby"}
            ]}),
        )
        .await
}

async fn invitations(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state
        .answer(
            &headers,
            json!([
                {"id": 7, "code": "R9865DQSYP", "status": "pending"},
                {"id": 8, "status": "used"}
            ]),
        )
        .await
}

async fn libraries(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state
        .answer(
            &headers,
            json!([
                {"id": 1, "name": "Movies", "server_name": "Main Plex"}
            ]),
        )
        .await
}

async fn servers(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state
        .answer(
            &headers,
            json!({"servers": [
                {"id": 1, "name": "Main Plex", "server_type": "plex"},
                {"id": 2, "name": "Backup Emby", "server_type": "emby"}
            ]}),
        )
        .await
}

async fn api_keys(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state
        .answer(
            &headers,
            json!({"data": [
                {"id": 1, "name": "bridge"},
                {"id": 2, "name": "old", "deleted_at": "2026-01-01T00:00:00Z"}
            ]}),
        )
        .await
}

async fn create_invitation(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    check_key(&headers)?;
    state.invitation_posts.fetch_add(1, Ordering::SeqCst);
    *state.last_invitation_body.lock().unwrap() = Some(body);
    if state.omit_invitation_url.load(Ordering::SeqCst) {
        Ok(Json(json!({"status": "created"})))
    } else {
        Ok(Json(json!({"invitation": {
            "id": 42,
            "code": "ABC123",
            "url": "http://192.168.1.29:5690/j/ABC123"
        }})))
    }
}

async fn delete_invitation(
    State(_state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_key(&headers)?;
    Ok(Json(json!({"status": "deleted", "id": id})))
}

async fn delete_user(
    State(_state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_key(&headers)?;
    Ok(Json(json!({"status": "deleted", "id": id})))
}

async fn extend_user(
    State(_state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    check_key(&headers)?;
    Ok(Json(json!({"status": "extended", "id": id, "days": body["days"]})))
}

/// In-process Wizarr stand-in serving the fixture payloads above.
pub struct MockWizarr {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockWizarr {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/status", get(status))
            .route("/api/users", get(users))
            .route("/api/invitations", get(invitations).post(create_invitation))
            .route("/api/invitations/{id}", delete(delete_invitation))
            .route("/api/libraries", get(libraries))
            .route("/api/servers", get(servers))
            .route("/api/api-keys", get(api_keys))
            .route("/api/users/{id}", delete(delete_user))
            .route("/api/users/{id}/extend", post(extend_user))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock wizarr should bind");
        let addr = listener.local_addr().expect("mock wizarr local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock wizarr serve");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn reset_counters(&self) {
        self.state.endpoint_hits.store(0, Ordering::SeqCst);
        self.state.invitation_posts.store(0, Ordering::SeqCst);
    }
}

// ---- mock SMTP ----

use mailin_embedded::response::{OK, START_DATA};
use mailin_embedded::{Handler, Response, Server};

/// Captured email data
#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub from: String,
    pub to: Vec<String>,
    pub data: String,
}

#[derive(Clone)]
struct EmailCapture {
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
    current_from: Arc<Mutex<String>>,
    current_to: Arc<Mutex<Vec<String>>>,
    current_data: Arc<Mutex<Vec<u8>>>,
}

impl Handler for EmailCapture {
    fn helo(&mut self, _ip: std::net::IpAddr, _domain: &str) -> Response {
        OK
    }

    fn mail(&mut self, _ip: std::net::IpAddr, _domain: &str, from: &str) -> Response {
        *self.current_from.lock().unwrap() = from.to_string();
        self.current_to.lock().unwrap().clear();
        self.current_data.lock().unwrap().clear();
        OK
    }

    fn rcpt(&mut self, to: &str) -> Response {
        self.current_to.lock().unwrap().push(to.to_string());
        OK
    }

    fn data_start(
        &mut self,
        _domain: &str,
        _from: &str,
        _is8bit: bool,
        _to: &[String],
    ) -> Response {
        START_DATA
    }

    fn data(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.current_data.lock().unwrap().extend_from_slice(buf);
        Ok(())
    }

    fn data_end(&mut self) -> Response {
        let data = String::from_utf8_lossy(&self.current_data.lock().unwrap()).to_string();
        let from = self.current_from.lock().unwrap().clone();
        let to = self.current_to.lock().unwrap().clone();

        self.emails
            .lock()
            .unwrap()
            .push(CapturedEmail { from, to, data });

        self.current_data.lock().unwrap().clear();
        OK
    }
}

/// Mock SMTP server that captures emails for testing.
pub struct MockSmtpServer {
    port: u16,
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
}

impl MockSmtpServer {
    /// Start on a random available port.
    pub fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);

        let emails: Arc<Mutex<Vec<CapturedEmail>>> = Arc::new(Mutex::new(Vec::new()));
        let emails_clone = emails.clone();

        std::thread::spawn(move || {
            let handler = EmailCapture {
                emails: emails_clone,
                current_from: Arc::new(Mutex::new(String::new())),
                current_to: Arc::new(Mutex::new(Vec::new())),
                current_data: Arc::new(Mutex::new(Vec::new())),
            };

            let mut server = Server::new(handler);
            server
                .with_addr(format!("127.0.0.1:{port}"))
                .expect("mock smtp address");
            let _ = server.serve();
        });

        std::thread::sleep(Duration::from_millis(100));

        Ok(Self { port, emails })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn get_emails(&self) -> Vec<CapturedEmail> {
        self.emails.lock().unwrap().clone()
    }

    /// Latest email addressed to `to_email`, with quoted-printable soft line
    /// breaks stripped so bodies can be matched as plain text.
    pub fn get_email_for(&self, to_email: &str) -> Option<CapturedEmail> {
        self.emails
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|e| e.to.iter().any(|t| t.contains(to_email)))
            .cloned()
            .map(|mut email| {
                email.data = email.data.replace("=\r\n", "").replace("=\n", "");
                email
            })
    }

    /// Wait for at least one email to arrive.
    pub fn wait_for_email(&self, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        while start.elapsed() < timeout {
            if !self.emails.lock().unwrap().is_empty() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        false
    }
}
