//! Shared test utilities for courseplan integration tests.
//!
//! Provides in-process HTTP servers standing in for the two external
//! collaborators:
//! - [`StoreServer`] -- the remote course-plan store (REST CRUD
//!   surface), with failure injection and api-key capture.
//! - [`CatalogServer`] -- the class catalog search endpoint, serving
//!   canned per-subject responses.
//!
//! Each test spawns its own servers on an ephemeral port; the handles
//! expose the backing state for seeding and assertions.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use serde_json::{Value, json};
use uuid::Uuid;

use courseplan_remote::models::{Course, SemesterRecord};

// ---------------------------------------------------------------------------
// Store server
// ---------------------------------------------------------------------------

/// Backing state of a [`StoreServer`].
#[derive(Default)]
pub struct StoreState {
    semesters: Mutex<Vec<SemesterRecord>>,
    courses: Mutex<HashMap<String, Vec<Course>>>,
    fail_requests: AtomicBool,
    api_keys_seen: Mutex<Vec<Option<String>>>,
}

impl StoreState {
    fn record_key(&self, headers: &HeaderMap) {
        let key = headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.api_keys_seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key);
    }

    fn failing(&self) -> bool {
        self.fail_requests.load(Ordering::SeqCst)
    }
}

/// In-process remote store implementing the REST CRUD contract.
pub struct StoreServer {
    base_url: String,
    state: Arc<StoreState>,
}

impl StoreServer {
    /// Bind an ephemeral port and serve the store in a background task.
    pub async fn spawn() -> Self {
        let state = Arc::new(StoreState::default());

        let app = Router::new()
            .route("/api/semesters", get(list_semesters).post(create_semester))
            .route(
                "/api/semesters/{semester_id}/courses",
                get(list_courses).post(create_course),
            )
            .route(
                "/api/semesters/{semester_id}/courses/{course_id}",
                axum::routing::delete(delete_course),
            )
            .route(
                "/api/semesters/{semester_id}/courses/{course_id}/notes",
                axum::routing::patch(update_notes),
            )
            .route(
                "/api/semesters/{semester_id}/courses/{course_id}/details",
                axum::routing::patch(update_details),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind store server port");
        let addr = listener.local_addr().expect("failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("store server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL for a `RemoteConfig` pointing at this server.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make every subsequent request fail with a 500.
    pub fn fail_requests(&self, fail: bool) {
        self.state.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Seed a semester directly into the backing state.
    pub fn seed_semester(&self, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.state
            .semesters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SemesterRecord {
                id: id.clone(),
                name: name.to_owned(),
            });
        id
    }

    /// Seed a course directly into a semester's backing state.
    pub fn seed_course(&self, semester_id: &str, mut course: Course) -> String {
        let id = Uuid::new_v4().to_string();
        course.storage_id = Some(id.clone());
        self.state
            .courses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(semester_id.to_owned())
            .or_default()
            .push(course);
        id
    }

    /// Snapshot of the stored semesters.
    pub fn semesters(&self) -> Vec<SemesterRecord> {
        self.state
            .semesters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Snapshot of the stored courses for a semester.
    pub fn courses(&self, semester_id: &str) -> Vec<Course> {
        self.state
            .courses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(semester_id)
            .cloned()
            .unwrap_or_default()
    }

    /// The `x-api-key` header value of every request seen, in order.
    pub fn api_keys_seen(&self) -> Vec<Option<String>> {
        self.state
            .api_keys_seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn failure() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "injected failure" })),
    )
}

async fn list_semesters(
    State(state): State<Arc<StoreState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record_key(&headers);
    if state.failing() {
        return failure().into_response();
    }
    let semesters = state
        .semesters
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    Json(semesters).into_response()
}

async fn create_semester(
    State(state): State<Arc<StoreState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record_key(&headers);
    if state.failing() {
        return failure().into_response();
    }
    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "missing semester name" })),
        )
            .into_response();
    };
    let id = Uuid::new_v4().to_string();
    state
        .semesters
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(SemesterRecord {
            id: id.clone(),
            name: name.to_owned(),
        });
    Json(json!({ "id": id })).into_response()
}

async fn list_courses(
    State(state): State<Arc<StoreState>>,
    Path(semester_id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record_key(&headers);
    if state.failing() {
        return failure().into_response();
    }
    let courses = state
        .courses
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(&semester_id)
        .cloned()
        .unwrap_or_default();
    Json(courses).into_response()
}

async fn create_course(
    State(state): State<Arc<StoreState>>,
    Path(semester_id): Path<String>,
    headers: HeaderMap,
    Json(mut course): Json<Course>,
) -> impl IntoResponse {
    state.record_key(&headers);
    if state.failing() {
        return failure().into_response();
    }
    // The store assigns the id; any client-sent id is discarded.
    let id = Uuid::new_v4().to_string();
    course.storage_id = Some(id.clone());
    state
        .courses
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .entry(semester_id)
        .or_default()
        .push(course);
    Json(json!({ "id": id })).into_response()
}

async fn delete_course(
    State(state): State<Arc<StoreState>>,
    Path((semester_id, course_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record_key(&headers);
    if state.failing() {
        return failure().into_response();
    }
    if let Some(courses) = state
        .courses
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get_mut(&semester_id)
    {
        courses.retain(|c| c.storage_id.as_deref() != Some(course_id.as_str()));
    }
    Json(json!({ "success": true })).into_response()
}

async fn update_notes(
    State(state): State<Arc<StoreState>>,
    Path((semester_id, course_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record_key(&headers);
    if state.failing() {
        return failure().into_response();
    }
    let notes = body
        .get("notes")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    update_course(&state, &semester_id, &course_id, |c| {
        c.notes = Some(notes.clone());
    })
}

async fn update_details(
    State(state): State<Arc<StoreState>>,
    Path((semester_id, course_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record_key(&headers);
    if state.failing() {
        return failure().into_response();
    }
    let show = body
        .get("showDetails")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    update_course(&state, &semester_id, &course_id, |c| {
        c.show_details = show;
    })
}

fn update_course(
    state: &StoreState,
    semester_id: &str,
    course_id: &str,
    apply: impl FnMut(&mut Course),
) -> axum::response::Response {
    let mut apply = apply;
    let mut courses = state.courses.lock().unwrap_or_else(|e| e.into_inner());
    let found = courses
        .get_mut(semester_id)
        .and_then(|list| {
            list.iter_mut()
                .find(|c| c.storage_id.as_deref() == Some(course_id))
        });
    match found {
        Some(course) => {
            apply(course);
            Json(json!({ "success": true })).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "no such course" })),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// Catalog server
// ---------------------------------------------------------------------------

/// Backing state of a [`CatalogServer`].
#[derive(Default)]
pub struct CatalogState {
    subjects: Mutex<HashMap<String, Value>>,
    fail_requests: AtomicBool,
}

/// In-process class catalog serving canned search responses.
pub struct CatalogServer {
    base_url: String,
    state: Arc<CatalogState>,
}

impl CatalogServer {
    /// Bind an ephemeral port and serve the catalog in a background
    /// task.
    pub async fn spawn() -> Self {
        let state = Arc::new(CatalogState::default());

        let app = Router::new()
            .route("/search/classes.json", get(search_classes))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind catalog server port");
        let addr = listener.local_addr().expect("failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("catalog server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL for a `CatalogConfig` pointing at this server.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make every subsequent request fail with a 500.
    pub fn fail_requests(&self, fail: bool) {
        self.state.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Serve `response` for searches on `subject`. The value must be a
    /// full search body (`{"data": {"classes": [...]}}`).
    pub fn set_subject(&self, subject: &str, response: Value) {
        self.state
            .subjects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(subject.to_owned(), response);
    }
}

async fn search_classes(
    State(state): State<Arc<CatalogState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if state.fail_requests.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "injected failure" })),
        )
            .into_response();
    }
    let subject = params.get("subject").cloned().unwrap_or_default();
    let body = state
        .subjects
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(&subject)
        .cloned()
        .unwrap_or_else(|| json!({ "data": { "classes": [] } }));
    Json(body).into_response()
}
