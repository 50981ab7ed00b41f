use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
}

/// What `/echo` observed about the request it received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub struct Store {
    users: RwLock<HashMap<u64, User>>,
    next_id: AtomicU64,
}

pub type Db = Arc<Store>;

type Failure = (StatusCode, Json<serde_json::Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(Store::default());
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/health", get(health))
        .route("/echo", any(echo))
        .route("/bytes/{len}", get(bytes))
        .route("/delay/{ms}", get(delay))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found(id: u64) -> Failure {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("user {id} not found") })),
    )
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let users = db.users.read().await;
    let mut list: Vec<User> = users.values().cloned().collect();
    list.sort_by_key(|user| user.id);
    Json(list)
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let user = User {
        id: db.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        name: input.name,
    };
    tracing::debug!(id = user.id, "user created");
    db.users.write().await.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, Failure> {
    let users = db.users.read().await;
    users.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, Failure> {
    let mut users = db.users.write().await;
    let user = users.get_mut(&id).ok_or_else(|| not_found(id))?;
    if let Some(name) = input.name {
        user.name = name;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, Failure> {
    let mut users = db.users.write().await;
    users.remove(&id).map(Json).ok_or_else(|| not_found(id))
}

async fn health() -> &'static str {
    "ok"
}

/// `len` bytes of `0xFF`, which is never valid UTF-8.
async fn bytes(Path(len): Path<usize>) -> ([(header::HeaderName, &'static str); 1], Vec<u8>) {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        vec![0xFF; len],
    )
}

async fn delay(Path(ms): Path<u64>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "waited_ms": ms }))
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Json(Echo {
        method: method.to_string(),
        content_type,
        body,
    })
}
