//! Pure state transitions.
//!
//! `reduce` is the only place state changes. Each slice has its own reducer;
//! the root routes an action to every slice that reacts to it, which is where
//! the cross-slice cascades live:
//!
//! - fetching todolists rebuilds the task map with one empty array per id,
//! - adding a todolist creates its empty task array,
//! - removing a todolist drops its task array,
//! - `ClearTasksAndTodolists` empties both stores.
//!
//! The task map is keyed by exactly the todolists in the store. Task results
//! for a todolist that is gone (removed while the request was in flight) are
//! dropped.

use tracing::{debug, trace};

use crate::action::Action;
use crate::state::{AppState, AuthState, RootState, TasksState, TodolistDomain, TodolistsState};

pub fn reduce(state: &mut RootState, action: &Action) {
    trace!(?action, "reduce");
    reduce_app(&mut state.app, action);
    reduce_auth(&mut state.auth, action);
    reduce_todolists(&mut state.todolists, action);
    reduce_tasks(&mut state.tasks, action);
}

fn reduce_app(state: &mut AppState, action: &Action) {
    match action {
        Action::SetAppStatus(status) => state.status = *status,
        Action::SetAppError(error) => state.error = error.clone(),
        Action::SetAppInitialized(initialized) => state.is_initialized = *initialized,
        _ => {}
    }
}

fn reduce_auth(state: &mut AuthState, action: &Action) {
    if let Action::SetLoggedIn(logged_in) = action {
        state.is_logged_in = *logged_in;
    }
}

fn reduce_todolists(state: &mut TodolistsState, action: &Action) {
    match action {
        Action::TodolistsFetched(todolists) => {
            state.items = todolists.iter().cloned().map(TodolistDomain::from).collect();
        }
        Action::TodolistAdded(todolist) => {
            state.items.insert(0, TodolistDomain::from(todolist.clone()));
        }
        Action::TodolistRemoved(id) => {
            state.items.retain(|t| t.id() != *id);
        }
        Action::TodolistTitleChanged { id, title } => {
            if let Some(todolist) = state.get_mut(*id) {
                todolist.todolist.title = title.clone();
            }
        }
        Action::TodolistFilterChanged { id, filter } => {
            if let Some(todolist) = state.get_mut(*id) {
                todolist.filter = *filter;
            }
        }
        Action::TodolistEntityStatusChanged { id, status } => {
            if let Some(todolist) = state.get_mut(*id) {
                todolist.entity_status = *status;
            }
        }
        Action::ClearTasksAndTodolists => state.items.clear(),
        _ => {}
    }
}

fn reduce_tasks(state: &mut TasksState, action: &Action) {
    match action {
        Action::TodolistsFetched(todolists) => {
            state.by_todolist = todolists.iter().map(|t| (t.id, Vec::new())).collect();
        }
        Action::TodolistAdded(todolist) => {
            state.by_todolist.insert(todolist.id, Vec::new());
        }
        Action::TodolistRemoved(id) => {
            state.by_todolist.remove(id);
        }
        Action::TasksFetched { todolist_id, tasks } => match state.by_todolist.get_mut(todolist_id) {
            Some(existing) => *existing = tasks.clone(),
            None => debug!(%todolist_id, "dropping tasks of unknown todolist"),
        },
        Action::TaskAdded(task) => match state.by_todolist.get_mut(&task.todo_list_id) {
            Some(tasks) => tasks.insert(0, task.clone()),
            None => debug!(todolist_id = %task.todo_list_id, "dropping task of unknown todolist"),
        },
        Action::TaskRemoved {
            todolist_id,
            task_id,
        } => {
            if let Some(tasks) = state.by_todolist.get_mut(todolist_id) {
                tasks.retain(|t| t.id != *task_id);
            }
        }
        Action::TaskUpdated {
            todolist_id,
            task_id,
            patch,
        } => {
            if let Some(task) = state
                .by_todolist
                .get_mut(todolist_id)
                .and_then(|tasks| tasks.iter_mut().find(|t| t.id == *task_id))
            {
                patch.apply_to(task);
            }
        }
        Action::ClearTasksAndTodolists => state.by_todolist.clear(),
        _ => {}
    }
}
