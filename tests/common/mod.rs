#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};

use dreamecho::client::SessionClient;
use dreamecho::config::ClientConfig;
use dreamecho::credentials::MemoryCredentialStore;

pub const PASSWORD: &str = "pw";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

/// Scripted behaviour plus everything the backend has seen.
pub struct MockState {
    pub requests: Vec<RecordedRequest>,
    pub dreams: Vec<Value>,
    pub valid_tokens: HashSet<String>,
    pub next_token: u32,
    pub next_dream: u32,

    /// Status forced on `GET /api/dreams`.
    pub list_status: Option<u16>,
    /// Status forced on `POST /api/dreams`.
    pub submit_status: Option<u16>,
    /// Status forced on every dream fetch by id.
    pub poll_status: Option<u16>,
    /// Status forced on the events handshake.
    pub events_status: Option<u16>,

    /// Body lines written on the events stream, newline-terminated.
    pub event_lines: Vec<String>,
    /// Keep the events stream open after the script instead of closing it.
    pub hold_events_open: bool,
    /// Status a dream moves to once its events script is served.
    pub status_after_events: &'static str,

    pub events_closed: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            dreams: Vec::new(),
            valid_tokens: HashSet::new(),
            next_token: 1,
            next_dream: 1,
            list_status: None,
            submit_status: None,
            poll_status: None,
            events_status: None,
            event_lines: vec![
                r#"{"status":"processing","progress":0.3}"#.to_string(),
                r#"data: {"status":"processing","progress":0.7,"message":"Sculpting"}"#.to_string(),
                r#"{"status":"completed","progress":1.0}"#.to_string(),
            ],
            hold_events_open: false,
            status_after_events: "complete",
            events_closed: 0,
        }
    }
}

pub struct Mock(Mutex<MockState>);

impl Mock {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().expect("mock state lock")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Authorization header of the most recent request to `path`.
    pub fn last_auth(&self, path: &str) -> Option<Option<String>> {
        self.state()
            .requests
            .iter()
            .rev()
            .find(|r| r.path == path)
            .map(|r| r.authorization.clone())
    }

    pub fn revoke(&self, token: &str) {
        self.state().valid_tokens.remove(token);
    }

    pub fn add_dream(&self, title: &str, status: &str) -> String {
        let mut st = self.state();
        let id = st.next_dream.to_string();
        st.next_dream += 1;
        st.dreams.push(dream_json(&id, title, "", status, &[]));
        id
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub mock: Arc<Mock>,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl MockBackend {
    pub fn config(&self, offline_fallback: bool) -> ClientConfig {
        let mut cfg = ClientConfig::new(self.base_url.clone());
        cfg.offline_fallback = offline_fallback;
        cfg.request_timeout_ms = 5_000;
        cfg.stream_read_timeout_ms = 5_000;
        cfg.fallback_step_delay_ms = 1;
        cfg
    }

    pub async fn client(&self, offline_fallback: bool) -> Result<(SessionClient, Arc<MemoryCredentialStore>)> {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = SessionClient::new(&self.config(offline_fallback), store.clone()).await?;
        Ok((client, store))
    }
}

pub async fn spawn_backend() -> Result<MockBackend> {
    let mock = Arc::new(Mock(Mutex::new(MockState::default())));

    let app = Router::new()
        .route("/api/auth/login", axum::routing::post(login))
        .route("/api/auth/register", axum::routing::post(register))
        .route("/api/session", get(session))
        .route("/api/dreams", get(list_dreams).post(create_dream))
        .route("/api/dreams/:id", get(get_dream))
        .route("/api/dreams/:id/events", get(dream_events))
        .route("/api/health", get(health))
        .layer(middleware::from_fn_with_state(mock.clone(), record))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind mock backend")?;
    let addr = listener.local_addr().context("mock backend addr")?;
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockBackend {
        base_url: format!("http://{}", addr),
        mock,
        server,
    })
}

/// Poll `cond` until it holds or a few seconds pass.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> Result<()> {
    for _ in 0..200 {
        if cond() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    anyhow::bail!("condition not reached")
}

pub fn dream_json(id: &str, title: &str, description: &str, status: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": description,
        "status": status,
        "tags": tags,
        "createdAt": "2024-05-01T10:00:00.123456",
        "updatedAt": "2024-05-01T10:00:00.123456",
    })
}

async fn record(State(mock): State<Arc<Mock>>, req: axum::extract::Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.state().requests.push(RecordedRequest {
        method: req.method().clone(),
        path: req.uri().path().to_string(),
        authorization,
    });
    next.run(req).await
}

fn error(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": message }))).into_response()
}

fn authorized(mock: &Mock, headers: &HeaderMap) -> bool {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return false;
    };
    mock.state().valid_tokens.contains(token)
}

fn issue_session(mock: &Mock, username: &str, email: &str) -> Value {
    let mut st = mock.state();
    let token = format!("T{}", st.next_token);
    st.next_token += 1;
    st.valid_tokens.insert(token.clone());
    json!({
        "user": {"id": "1", "username": username, "email": email},
        "token": token,
    })
}

async fn login(State(mock): State<Arc<Mock>>, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return error(401, "invalid credentials");
    }
    let email = body["email"].as_str().unwrap_or_default();
    Json(issue_session(&mock, "alice", email)).into_response()
}

async fn register(State(mock): State<Arc<Mock>>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if username.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "username is required"})))
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    (StatusCode::CREATED, Json(issue_session(&mock, username, email))).into_response()
}

async fn session(State(mock): State<Arc<Mock>>, headers: HeaderMap) -> Response {
    if !authorized(&mock, &headers) {
        return error(401, "unauthorized");
    }
    Json(json!({
        "user": {"id": "1", "username": "alice", "email": "alice@example.com"},
        "token": "unused",
    }))
    .into_response()
}

async fn list_dreams(State(mock): State<Arc<Mock>>, headers: HeaderMap) -> Response {
    if !authorized(&mock, &headers) {
        return error(401, "unauthorized");
    }
    let st = mock.state();
    if let Some(status) = st.list_status {
        return error(status, "list failed");
    }
    Json(Value::Array(st.dreams.clone())).into_response()
}

async fn create_dream(
    State(mock): State<Arc<Mock>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&mock, &headers) {
        return error(401, "unauthorized");
    }
    let mut st = mock.state();
    if let Some(status) = st.submit_status {
        return error(status, "generation backend unavailable");
    }
    let title = body["title"].as_str().unwrap_or_default();
    let description = body["description"].as_str().unwrap_or_default();
    if title.is_empty() || description.is_empty() {
        return error(400, "title and description are required");
    }
    let id = st.next_dream.to_string();
    st.next_dream += 1;
    let dream = dream_json(&id, title, description, "pending", &["ocean", "glass"]);
    st.dreams.push(dream.clone());
    (StatusCode::CREATED, Json(dream)).into_response()
}

async fn get_dream(
    State(mock): State<Arc<Mock>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&mock, &headers) {
        return error(401, "unauthorized");
    }
    let st = mock.state();
    if let Some(status) = st.poll_status {
        return error(status, "poll failed");
    }
    match st.dreams.iter().find(|d| d["id"] == id.as_str()) {
        Some(dream) => Json(dream.clone()).into_response(),
        None => error(404, "dream not found"),
    }
}

/// Counts closed event streams when the response body is dropped.
struct CloseGuard(Arc<Mock>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.state().events_closed += 1;
    }
}

async fn dream_events(
    State(mock): State<Arc<Mock>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&mock, &headers) {
        return error(401, "unauthorized");
    }
    let (lines, hold_open) = {
        let mut st = mock.state();
        if let Some(status) = st.events_status {
            return error(status, "events unavailable");
        }
        let next_status = st.status_after_events;
        if let Some(dream) = st.dreams.iter_mut().find(|d| d["id"] == id.as_str()) {
            dream["status"] = json!(next_status);
        }
        let lines: Vec<String> = st.event_lines.iter().map(|l| format!("{}\n", l)).collect();
        (lines, st.hold_events_open)
    };

    let guard = CloseGuard(mock.clone());
    let body = stream::iter(lines.into_iter().map(Ok::<_, std::io::Error>));
    let body = if hold_open {
        body.chain(stream::pending()).boxed()
    } else {
        body.boxed()
    };
    let body = body.map(move |chunk| {
        let _guard = &guard;
        chunk
    });

    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(body),
    )
        .into_response()
}

async fn health() -> Response {
    Json(json!({"deepseek": "OK", "tripo": "degraded"})).into_response()
}
