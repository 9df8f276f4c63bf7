#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use cadastro::api::{ApiError, UserApi};
use cadastro::models::{PermissionSet, UserRecord, UserType};

pub fn ana() -> UserRecord {
    UserRecord {
        id: None,
        name: "Ana".into(),
        email: "ana@x.com".into(),
        phone: "111".into(),
        organization: "Saude".into(),
        user_type: Some(UserType::Administrator),
        permissions: PermissionSet {
            permission1: true,
            permission2: false,
            permission3: false,
        },
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    List,
    Fetch(String),
    Create(UserRecord),
    Update(String, UserRecord),
}

/// In-memory backend that records every call.
#[derive(Default)]
pub struct MockUserApi {
    pub users: Mutex<HashMap<String, UserRecord>>,
    pub calls: Mutex<Vec<Call>>,
    pub fail_list: bool,
    pub fail_fetch: bool,
    pub fail_writes: Mutex<bool>,
    /// Hold create/update calls this long before answering.
    pub write_delay: Option<Duration>,
}

impl MockUserApi {
    pub fn with_user(id: &str, record: UserRecord) -> Self {
        let api = MockUserApi::default();
        api.users.lock().unwrap().insert(id.to_string(), record);
        api
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn down() -> ApiError {
        ApiError::Network("connection refused (os error 111)".into())
    }
}

#[async_trait]
impl UserApi for MockUserApi {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.record(Call::List);
        if self.fail_list {
            return Err(Self::down());
        }
        let users = self.users.lock().unwrap();
        let mut out: Vec<UserRecord> = users
            .iter()
            .map(|(id, rec)| UserRecord {
                id: Some(id.clone()),
                ..rec.clone()
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn fetch_user(&self, id: &str) -> Result<UserRecord, ApiError> {
        self.record(Call::Fetch(id.to_string()));
        if self.fail_fetch {
            return Err(Self::down());
        }
        self.users
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                body: "not found".into(),
            })
    }

    async fn create_user(&self, record: &UserRecord) -> Result<Value, ApiError> {
        self.record(Call::Create(record.clone()));
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_writes.lock().unwrap() {
            return Err(Self::down());
        }
        let mut users = self.users.lock().unwrap();
        let id = (users.len() + 1).to_string();
        users.insert(id.clone(), record.clone());
        Ok(json!({ "id": id }))
    }

    async fn update_user(&self, id: &str, record: &UserRecord) -> Result<Value, ApiError> {
        self.record(Call::Update(id.to_string(), record.clone()));
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_writes.lock().unwrap() {
            return Err(Self::down());
        }
        self.users.lock().unwrap().insert(id.to_string(), record.clone());
        Ok(Value::Null)
    }
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct FakeBackendState {
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    pub users: Arc<Mutex<HashMap<String, Value>>>,
    pub write_status: Arc<Mutex<Option<StatusCode>>>,
}

impl FakeBackendState {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, method: Method, uri: &Uri, body: &Bytes) {
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(body).unwrap_or(Value::Null)
        };
        self.requests.lock().unwrap().push(Recorded {
            method,
            path: uri.path().to_string(),
            body,
        });
    }
}

async fn fake_list(State(s): State<FakeBackendState>, method: Method, uri: Uri) -> impl IntoResponse {
    s.push(method, &uri, &Bytes::new());
    let users: Vec<Value> = s.users.lock().unwrap().values().cloned().collect();
    Json(Value::Array(users))
}

async fn fake_fetch(
    State(s): State<FakeBackendState>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> impl IntoResponse {
    s.push(method, &uri, &Bytes::new());
    match s.users.lock().unwrap().get(&id) {
        Some(u) => (StatusCode::OK, Json(u.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response(),
    }
}

async fn fake_write(State(s): State<FakeBackendState>, method: Method, uri: Uri, body: Bytes) -> impl IntoResponse {
    s.push(method, &uri, &body);
    match *s.write_status.lock().unwrap() {
        Some(status) => (status, Json(json!({"message": "boom"}))).into_response(),
        None => (StatusCode::OK, Json(json!({"message": "ok"}))).into_response(),
    }
}

/// Start an HTTP backend speaking the user REST contract on an ephemeral port.
pub async fn spawn_backend(state: FakeBackendState) -> String {
    let app = Router::new()
        .route("/usuarios", get(fake_list))
        .route("/usuarios/:id", get(fake_fetch))
        .route("/cadastrar-usuario", post(fake_write))
        .route("/editar-user/:id", put(fake_write))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
