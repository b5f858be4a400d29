//! Wire DTOs for the todolist API.
//!
//! # Design
//! Field names follow the server's camelCase JSON. Task status and priority
//! travel as small integers, so their enums convert through `u8` instead of
//! serializing by name. Timestamps are kept as the strings the server sent;
//! the core never does date arithmetic and round-trips them unchanged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result code carried by every envelope response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ResultCode {
    Success,
    Error,
    Captcha,
    Other(i32),
}

impl ResultCode {
    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::Error,
            10 => ResultCode::Captcha,
            other => ResultCode::Other(other),
        }
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::Success => 0,
            ResultCode::Error => 1,
            ResultCode::Captcha => 10,
            ResultCode::Other(other) => other,
        }
    }
}

/// Per-field validation error reported alongside `messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// Decoded `{resultCode, messages, fieldsErrors, data}` envelope.
///
/// `data` is only decoded when the result code is `Success`; failed responses
/// frequently carry an empty object that does not match the success shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<D> {
    pub result_code: ResultCode,
    pub messages: Vec<String>,
    pub fields_errors: Vec<FieldError>,
    pub data: Option<D>,
}

/// `{item: ...}` payload returned by create endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData<T> {
    pub item: T,
}

/// Empty `{}` payload returned by update/delete endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyData {}

/// A todolist as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todolist {
    pub id: Uuid,
    pub title: String,
    pub added_date: String,
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Draft,
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskStatus::New),
            1 => Ok(TaskStatus::InProgress),
            2 => Ok(TaskStatus::Completed),
            3 => Ok(TaskStatus::Draft),
            other => Err(format!("invalid task status: {other}")),
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::New => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed => 2,
            TaskStatus::Draft => 3,
        }
    }
}

/// Task priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskPriority {
    #[default]
    Low,
    Middle,
    High,
    Urgent,
    Later,
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskPriority::Low),
            1 => Ok(TaskPriority::Middle),
            2 => Ok(TaskPriority::High),
            3 => Ok(TaskPriority::Urgent),
            4 => Ok(TaskPriority::Later),
            other => Err(format!("invalid task priority: {other}")),
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Low => 0,
            TaskPriority::Middle => 1,
            TaskPriority::High => 2,
            TaskPriority::Urgent => 3,
            TaskPriority::Later => 4,
        }
    }
}

/// A single task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub todo_list_id: Uuid,
    #[serde(default)]
    pub order: i64,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    pub added_date: String,
}

/// Response of `GET todo-lists/{id}/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTasksResponse {
    pub items: Vec<Task>,
    pub total_count: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request payload for creating a todolist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodolist {
    pub title: String,
}

/// Request payload for renaming a todolist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodolistTitle {
    pub title: String,
}

/// Request payload for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
}

/// Complete task record the update endpoint requires. Every field is sent,
/// including nulls; the server replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskModel {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
}

/// Partial change requested by the caller of `update_task`.
///
/// `None` leaves a field as it currently is in local state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
}

impl UpdateTaskPatch {
    /// Build the full update payload by laying this patch over `task`.
    pub fn merge_onto(&self, task: &Task) -> UpdateTaskModel {
        UpdateTaskModel {
            title: self.title.clone().unwrap_or_else(|| task.title.clone()),
            description: self.description.clone().or_else(|| task.description.clone()),
            status: self.status.unwrap_or(task.status),
            priority: self.priority.unwrap_or(task.priority),
            start_date: self.start_date.clone().or_else(|| task.start_date.clone()),
            deadline: self.deadline.clone().or_else(|| task.deadline.clone()),
        }
    }

    /// Splice the fields present in this patch into a stored task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(start_date) = &self.start_date {
            task.start_date = Some(start_date.clone());
        }
        if let Some(deadline) = &self.deadline {
            task.deadline = Some(deadline.clone());
        }
    }
}

/// Credentials for `auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
}

/// `data` of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user_id: i64,
}

/// `data` of a successful `auth/me` probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeData {
    pub id: i64,
    pub email: String,
    pub login: String,
}
