//! In-memory view state: one struct per slice plus the root that owns them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Task, TaskStatus, Todolist};

/// Progress of a request, used both globally and per todolist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Which subset of a todolist's tasks is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterValue {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterValue {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Active => task.status == TaskStatus::New,
            FilterValue::Completed => task.status == TaskStatus::Completed,
        }
    }
}

/// A todolist plus the client-only fields the UI needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodolistDomain {
    #[serde(flatten)]
    pub todolist: Todolist,
    pub filter: FilterValue,
    pub entity_status: RequestStatus,
}

impl From<Todolist> for TodolistDomain {
    fn from(todolist: Todolist) -> Self {
        Self {
            todolist,
            filter: FilterValue::All,
            entity_status: RequestStatus::Idle,
        }
    }
}

impl TodolistDomain {
    pub fn id(&self) -> Uuid {
        self.todolist.id
    }
}

/// Ordered todolists, newest first after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodolistsState {
    pub items: Vec<TodolistDomain>,
}

impl TodolistsState {
    pub fn get(&self, id: Uuid) -> Option<&TodolistDomain> {
        self.items.iter().find(|t| t.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut TodolistDomain> {
        self.items.iter_mut().find(|t| t.id() == id)
    }
}

/// Tasks keyed by owning todolist id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksState {
    pub by_todolist: HashMap<Uuid, Vec<Task>>,
}

impl TasksState {
    pub fn get(&self, todolist_id: Uuid) -> Option<&[Task]> {
        self.by_todolist.get(&todolist_id).map(Vec::as_slice)
    }

    pub fn find(&self, todolist_id: Uuid, task_id: Uuid) -> Option<&Task> {
        self.by_todolist
            .get(&todolist_id)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub is_logged_in: bool,
}

/// Process-wide request status and the last error shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub status: RequestStatus,
    pub error: Option<String>,
    pub is_initialized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootState {
    pub app: AppState,
    pub auth: AuthState,
    pub todolists: TodolistsState,
    pub tasks: TasksState,
}

impl RootState {
    /// Tasks of `todolist_id` that pass its current filter, in stored order.
    pub fn visible_tasks(&self, todolist_id: Uuid) -> Vec<&Task> {
        let Some(todolist) = self.todolists.get(todolist_id) else {
            return Vec::new();
        };
        self.tasks
            .get(todolist_id)
            .unwrap_or_default()
            .iter()
            .filter(|task| todolist.filter.matches(task))
            .collect()
    }
}
