//! In-process fake of the brief API and its storage service.
//!
//! Serves the same routes and JSON shapes as the deployed backend (including
//! its `briefId`/`uploads`/`putUrl`/`final` field names) on an ephemeral
//! port, so the real HTTP clients can be exercised end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use proofbrief_core::config::ApiConfig;

/// Re-export fixtures for test convenience
pub use proofbrief_core::testing::fixtures;

/// An object written to fake storage.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
struct StoredBrief {
    name: String,
    title: String,
    started: bool,
    polls: u32,
    created_at: String,
}

#[derive(Default)]
struct Inner {
    base_url: String,
    briefs: HashMap<String, StoredBrief>,
    /// Creation order, oldest first.
    order: Vec<String>,
    objects: HashMap<String, StoredObject>,
    /// Method and path of every request, in arrival order.
    requests: Vec<String>,
    /// `Authorization` header of every brief API request.
    auth_headers: Vec<Option<String>>,
    /// Poll number at which a started brief reports completion.
    complete_after_polls: u32,
    /// Analysis document stored when a brief completes. `None` completes
    /// without an artifact.
    result_document: Option<Value>,
    fail_create_status: Option<u16>,
    rejected_storage_key_suffix: Option<String>,
    delete_rejection: Option<(u16, Value)>,
}

/// Handle to a running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    pub base_url: String,
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    /// Bind to `127.0.0.1:0` and start serving.
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            complete_after_polls: 1,
            result_document: Some(fixtures::analysis_json(74.0, 4)),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/briefs", get(list_briefs).post(create_brief))
            .route("/briefs/{id}", get(get_brief).delete(delete_brief))
            .route("/briefs/{id}/start", put(start_brief))
            .route("/storage/{*key}", get(read_object).put(write_object))
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let base_url = format!(
            "http://{}",
            listener.local_addr().expect("Failed to read local addr")
        );
        inner.lock().await.base_url = base_url.clone();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend failed");
        });

        Self { base_url, inner }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        }
    }

    pub async fn complete_after_polls(&self, polls: u32) {
        self.inner.lock().await.complete_after_polls = polls;
    }

    pub async fn set_result_document(&self, document: Option<Value>) {
        self.inner.lock().await.result_document = document;
    }

    pub async fn fail_create_with(&self, status: u16) {
        self.inner.lock().await.fail_create_status = Some(status);
    }

    /// Reject storage writes whose key ends with `suffix`.
    pub async fn reject_storage_writes_to(&self, suffix: &str) {
        self.inner.lock().await.rejected_storage_key_suffix = Some(suffix.to_string());
    }

    pub async fn accept_all_storage_writes(&self) {
        self.inner.lock().await.rejected_storage_key_suffix = None;
    }

    pub async fn reject_deletes_with(&self, status: u16, body: Value) {
        self.inner.lock().await.delete_rejection = Some((status, body));
    }

    pub async fn requests(&self) -> Vec<String> {
        self.inner.lock().await.requests.clone()
    }

    pub async fn count_requests(&self, prefix: &str) -> usize {
        self.inner
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub async fn auth_headers(&self) -> Vec<Option<String>> {
        self.inner.lock().await.auth_headers.clone()
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.inner.lock().await.objects.get(key).cloned()
    }

    pub async fn brief_count(&self) -> usize {
        self.inner.lock().await.briefs.len()
    }

    /// Polls served so far for `id`.
    pub async fn polls(&self, id: &str) -> u32 {
        self.inner
            .lock()
            .await
            .briefs
            .get(id)
            .map(|b| b.polls)
            .unwrap_or(0)
    }

    /// Create a brief directly, bypassing the API.
    pub async fn seed_brief(&self, id: &str, name: &str, title: &str) {
        let mut inner = self.inner.lock().await;
        inner.briefs.insert(
            id.to_string(),
            StoredBrief {
                name: name.to_string(),
                title: title.to_string(),
                started: false,
                polls: 0,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        inner.order.push(id.to_string());
    }
}

type Shared = Arc<Mutex<Inner>>;

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn log_api_request(inner: &mut Inner, line: String, headers: &HeaderMap) {
    inner.requests.push(line);
    inner.auth_headers.push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
}

fn result_key(id: &str) -> String {
    format!("briefs/{}/final.json", id)
}

fn brief_json(inner: &Inner, id: &str, brief: &StoredBrief, done: bool) -> Value {
    let mut body = json!({
        "briefId": id,
        "status": if done { "DONE" } else { "PENDING" },
        "candidate": { "id": format!("c-{}", id), "name": brief.name },
        "job": { "id": format!("j-{}", id), "title": brief.title },
        "createdAt": brief.created_at,
    });
    if done && inner.objects.contains_key(&result_key(id)) {
        body["final"] = json!({
            "key": result_key(id),
            "url": format!("{}/storage/{}", inner.base_url, result_key(id)),
        });
    }
    body
}

async fn create_brief(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.lock().await;
    log_api_request(&mut inner, "POST /briefs".to_string(), &headers);

    if let Some(status) = inner.fail_create_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return message(status, "Failed to create brief");
    }

    let name = body["candidate"]["fullName"].as_str().unwrap_or_default();
    let title = body["job"]["title"].as_str().unwrap_or_default();
    if name.is_empty() || title.is_empty() {
        return message(StatusCode::BAD_REQUEST, "candidate.fullName and job.title are required");
    }

    let id = Uuid::new_v4().to_string();
    inner.briefs.insert(
        id.clone(),
        StoredBrief {
            name: name.to_string(),
            title: title.to_string(),
            started: false,
            polls: 0,
            created_at: chrono::Utc::now().to_rfc3339(),
        },
    );
    inner.order.push(id.clone());

    let resume_key = format!("candidates/{}/resume_original.pdf", id);
    let jd_key = format!("jobs/{}/jd.txt", id);
    let body = json!({
        "briefId": id,
        "uploads": {
            "resume": {
                "key": resume_key,
                "putUrl": format!("{}/storage/{}", inner.base_url, resume_key),
            },
            "jd": {
                "key": jd_key,
                "putUrl": format!("{}/storage/{}", inner.base_url, jd_key),
            },
        },
    });
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn start_brief(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut inner = state.lock().await;
    log_api_request(&mut inner, format!("PUT /briefs/{}/start", id), &headers);

    match inner.briefs.get_mut(&id) {
        Some(brief) => {
            brief.started = true;
            message(StatusCode::OK, "Processing started")
        }
        None => message(StatusCode::NOT_FOUND, "Brief not found"),
    }
}

async fn get_brief(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut guard = state.lock().await;
    let inner = &mut *guard;
    log_api_request(inner, format!("GET /briefs/{}", id), &headers);

    let Some(brief) = inner.briefs.get_mut(&id) else {
        return message(StatusCode::NOT_FOUND, "Brief not found");
    };
    brief.polls += 1;
    let done = brief.started && brief.polls >= inner.complete_after_polls;
    let brief = brief.clone();

    if done && !inner.objects.contains_key(&result_key(&id)) {
        if let Some(document) = inner.result_document.clone() {
            inner.objects.insert(
                result_key(&id),
                StoredObject {
                    content_type: Some("application/json".to_string()),
                    body: serde_json::to_vec(&document).unwrap_or_default(),
                },
            );
        }
    }

    Json(brief_json(inner, &id, &brief, done)).into_response()
}

async fn list_briefs(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut inner = state.lock().await;
    log_api_request(&mut inner, "GET /briefs".to_string(), &headers);

    let items: Vec<Value> = inner
        .order
        .iter()
        .rev()
        .filter_map(|id| inner.briefs.get(id).map(|b| brief_json(&inner, id, b, false)))
        .collect();
    Json(Value::Array(items)).into_response()
}

async fn delete_brief(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut inner = state.lock().await;
    log_api_request(&mut inner, format!("DELETE /briefs/{}", id), &headers);

    if let Some((status, body)) = inner.delete_rejection.clone() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::FORBIDDEN);
        return (status, Json(body)).into_response();
    }
    if inner.briefs.remove(&id).is_none() {
        return message(StatusCode::NOT_FOUND, "Brief not found");
    }
    inner.order.retain(|existing| existing != &id);
    message(StatusCode::OK, "Brief deleted")
}

async fn write_object(
    State(state): State<Shared>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut inner = state.lock().await;
    inner.requests.push(format!("PUT /storage/{}", key));

    if let Some(suffix) = &inner.rejected_storage_key_suffix {
        if key.ends_with(suffix.as_str()) {
            return (
                StatusCode::FORBIDDEN,
                "<Error><Code>AccessDenied</Code></Error>",
            )
                .into_response();
        }
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    inner.objects.insert(
        key,
        StoredObject {
            content_type,
            body: body.to_vec(),
        },
    );
    StatusCode::OK.into_response()
}

async fn read_object(State(state): State<Shared>, Path(key): Path<String>) -> Response {
    let mut inner = state.lock().await;
    inner.requests.push(format!("GET /storage/{}", key));

    match inner.objects.get(&key) {
        Some(object) => (
            [(header::CONTENT_TYPE, "application/json")],
            object.body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "<Error><Code>NoSuchKey</Code></Error>",
        )
            .into_response(),
    }
}
