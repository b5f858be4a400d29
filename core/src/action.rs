//! Every state change the store can make, as data.
//!
//! Operations never touch state directly; they dispatch one of these and the
//! reducer applies it. Actions that several slices react to (for example
//! `TodolistRemoved`) are single variants so the cascade happens atomically.

use uuid::Uuid;

use crate::state::{FilterValue, RequestStatus};
use crate::types::{Task, Todolist, UpdateTaskPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // app
    SetAppStatus(RequestStatus),
    SetAppError(Option<String>),
    SetAppInitialized(bool),

    // auth
    SetLoggedIn(bool),

    // todolists
    TodolistsFetched(Vec<Todolist>),
    TodolistAdded(Todolist),
    TodolistRemoved(Uuid),
    TodolistTitleChanged { id: Uuid, title: String },
    TodolistFilterChanged { id: Uuid, filter: FilterValue },
    TodolistEntityStatusChanged { id: Uuid, status: RequestStatus },

    // tasks
    TasksFetched { todolist_id: Uuid, tasks: Vec<Task> },
    TaskAdded(Task),
    TaskRemoved { todolist_id: Uuid, task_id: Uuid },
    TaskUpdated {
        todolist_id: Uuid,
        task_id: Uuid,
        patch: UpdateTaskPatch,
    },

    /// Drop every todolist and every task array.
    ClearTasksAndTodolists,
}
