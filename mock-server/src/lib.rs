//! In-memory implementation of the todolist REST API.
//!
//! Answers with the same shapes as the real service: most endpoints wrap
//! their payload in a `{resultCode, messages, fieldsErrors, data}` envelope,
//! `GET /todo-lists` returns a bare array and `GET /todo-lists/{id}/tasks`
//! returns `{items, totalCount, error}`. Validation failures are reported with
//! `resultCode: 1` and HTTP 200, as the real service does.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const MAX_TITLE_LEN: usize = 100;
pub const DEFAULT_EMAIL: &str = "free@samuraijs.com";
pub const DEFAULT_PASSWORD: &str = "free";
const USER_ID: i64 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todolist {
    pub id: Uuid,
    pub title: String,
    pub added_date: String,
    pub order: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub todo_list_id: Uuid,
    pub order: i64,
    pub status: u8,
    pub priority: u8,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    pub added_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub result_code: i32,
    pub messages: Vec<String>,
    pub fields_errors: Vec<Value>,
    pub data: Value,
}

impl Envelope {
    fn ok(data: Value) -> Json<Self> {
        Json(Self {
            result_code: 0,
            messages: Vec::new(),
            fields_errors: Vec::new(),
            data,
        })
    }

    fn fail(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            result_code: 1,
            messages: vec![message.into()],
            fields_errors: Vec::new(),
            data: json!({}),
        })
    }
}

#[derive(Deserialize)]
pub struct TitleInput {
    pub title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: u8,
    pub priority: u8,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Db {
    credentials: Credentials,
    logged_in: bool,
    todolists: Vec<Todolist>,
    tasks: HashMap<Uuid, Vec<Task>>,
}

pub type SharedDb = Arc<RwLock<Db>>;

pub fn app() -> Router {
    app_with_credentials(Credentials::default())
}

pub fn app_with_credentials(credentials: Credentials) -> Router {
    let db: SharedDb = Arc::new(RwLock::new(Db {
        credentials,
        ..Db::default()
    }));
    Router::new()
        .route("/todo-lists", get(list_todolists).post(create_todolist))
        .route(
            "/todo-lists/{id}",
            put(update_todolist).delete(delete_todolist),
        )
        .route("/todo-lists/{id}/tasks", get(list_tasks).post(create_task))
        .route(
            "/todo-lists/{id}/tasks/{task_id}",
            put(update_task).delete(delete_task),
        )
        .route("/auth/login", post(login).delete(logout))
        .route("/auth/me", get(me))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock todolist api listening");
    }
    axum::serve(listener, app()).await
}

fn now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("Title max length is {MAX_TITLE_LEN}"));
    }
    Ok(())
}

// -- todolists --------------------------------------------------------------

async fn list_todolists(State(db): State<SharedDb>) -> Json<Vec<Todolist>> {
    Json(db.read().await.todolists.clone())
}

async fn create_todolist(
    State(db): State<SharedDb>,
    Json(input): Json<TitleInput>,
) -> Json<Envelope> {
    if let Err(message) = validate_title(&input.title) {
        return Envelope::fail(message);
    }
    let mut db = db.write().await;
    let order = db.todolists.iter().map(|t| t.order).min().unwrap_or(0) - 1;
    let todolist = Todolist {
        id: Uuid::new_v4(),
        title: input.title,
        added_date: now(),
        order,
    };
    debug!(id = %todolist.id, "todolist created");
    db.todolists.insert(0, todolist.clone());
    db.tasks.insert(todolist.id, Vec::new());
    Envelope::ok(json!({ "item": todolist }))
}

async fn update_todolist(
    State(db): State<SharedDb>,
    Path(id): Path<Uuid>,
    Json(input): Json<TitleInput>,
) -> Json<Envelope> {
    if let Err(message) = validate_title(&input.title) {
        return Envelope::fail(message);
    }
    let mut db = db.write().await;
    match db.todolists.iter_mut().find(|t| t.id == id) {
        Some(todolist) => {
            todolist.title = input.title;
            Envelope::ok(json!({}))
        }
        None => Envelope::fail("Todolist not found"),
    }
}

async fn delete_todolist(State(db): State<SharedDb>, Path(id): Path<Uuid>) -> Json<Envelope> {
    let mut db = db.write().await;
    let before = db.todolists.len();
    db.todolists.retain(|t| t.id != id);
    if db.todolists.len() == before {
        return Envelope::fail("Todolist not found");
    }
    db.tasks.remove(&id);
    debug!(%id, "todolist deleted");
    Envelope::ok(json!({}))
}

// -- tasks ------------------------------------------------------------------

async fn list_tasks(State(db): State<SharedDb>, Path(id): Path<Uuid>) -> Json<Value> {
    let db = db.read().await;
    match db.tasks.get(&id) {
        Some(tasks) => Json(json!({
            "items": tasks,
            "totalCount": tasks.len(),
            "error": null
        })),
        None => Json(json!({
            "items": [],
            "totalCount": 0,
            "error": "Todolist not found"
        })),
    }
}

async fn create_task(
    State(db): State<SharedDb>,
    Path(id): Path<Uuid>,
    Json(input): Json<TitleInput>,
) -> Json<Envelope> {
    if let Err(message) = validate_title(&input.title) {
        return Envelope::fail(message);
    }
    let mut db = db.write().await;
    let Some(tasks) = db.tasks.get_mut(&id) else {
        return Envelope::fail("Todolist not found");
    };
    let order = tasks.iter().map(|t| t.order).min().unwrap_or(0) - 1;
    let task = Task {
        id: Uuid::new_v4(),
        title: input.title,
        description: None,
        todo_list_id: id,
        order,
        status: 0,
        priority: 1,
        start_date: None,
        deadline: None,
        added_date: now(),
    };
    tasks.insert(0, task.clone());
    Envelope::ok(json!({ "item": task }))
}

async fn update_task(
    State(db): State<SharedDb>,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateTaskInput>,
) -> Json<Envelope> {
    if let Err(message) = validate_title(&input.title) {
        return Envelope::fail(message);
    }
    let mut db = db.write().await;
    let task = db
        .tasks
        .get_mut(&id)
        .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id));
    let Some(task) = task else {
        return Envelope::fail("Task not found");
    };
    task.title = input.title;
    task.description = input.description;
    task.status = input.status;
    task.priority = input.priority;
    task.start_date = input.start_date;
    task.deadline = input.deadline;
    Envelope::ok(json!({ "item": task.clone() }))
}

async fn delete_task(
    State(db): State<SharedDb>,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
) -> Json<Envelope> {
    let mut db = db.write().await;
    let Some(tasks) = db.tasks.get_mut(&id) else {
        return Envelope::fail("Todolist not found");
    };
    let before = tasks.len();
    tasks.retain(|t| t.id != task_id);
    if tasks.len() == before {
        return Envelope::fail("Task not found");
    }
    Envelope::ok(json!({}))
}

// -- auth -------------------------------------------------------------------

async fn login(State(db): State<SharedDb>, Json(input): Json<LoginInput>) -> Json<Envelope> {
    let mut db = db.write().await;
    if input.email != db.credentials.email || input.password != db.credentials.password {
        return Envelope::fail("Incorrect Email or Password");
    }
    db.logged_in = true;
    debug!(email = %input.email, remember_me = input.remember_me, "login");
    Envelope::ok(json!({ "userId": USER_ID }))
}

async fn logout(State(db): State<SharedDb>) -> Json<Envelope> {
    db.write().await.logged_in = false;
    Envelope::ok(json!({}))
}

async fn me(State(db): State<SharedDb>) -> Json<Envelope> {
    let db = db.read().await;
    if !db.logged_in {
        return Envelope::fail("You are not authorized");
    }
    let login = db
        .credentials
        .email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string();
    Envelope::ok(json!({
        "id": USER_ID,
        "email": db.credentials.email,
        "login": login
    }))
}
