use tracing::{debug, warn};
use uuid::Uuid;

use super::Store;
use crate::action::Action;
use crate::error::OperationError;
use crate::http::Transport;
use crate::state::RequestStatus;
use crate::types::{CreateTask, ResultCode, Task, UpdateTaskPatch};

impl<T: Transport> Store<T> {
    /// Replace the tasks of one todolist with the server's copy.
    pub async fn fetch_tasks(&self, todolist_id: Uuid) -> Result<Vec<Task>, OperationError> {
        debug!(%todolist_id, "fetching tasks");
        self.set_status(RequestStatus::Loading).await;
        let request = Ok(self.client.build_get_tasks(todolist_id));
        let response = self
            .call(request, |c, r| c.parse_get_tasks(r), true)
            .await?;
        if let Some(error) = response.error {
            return Err(self.reject(ResultCode::Error.into(), vec![error]).await);
        }

        self.dispatch_all(vec![
            Action::TasksFetched {
                todolist_id,
                tasks: response.items.clone(),
            },
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(response.items)
    }

    /// Create a task; it is inserted first in its todolist.
    pub async fn add_task(&self, title: &str, todolist_id: Uuid) -> Result<Task, OperationError> {
        debug!(%todolist_id, title, "adding task");
        self.set_status(RequestStatus::Loading).await;
        let input = CreateTask {
            title: title.to_string(),
        };
        let request = self.client.build_create_task(todolist_id, &input);
        let envelope = self
            .call(request, |c, r| c.parse_create_task(r), true)
            .await?;
        let task = self.expect_success(envelope, true).await?.item;

        self.dispatch_all(vec![
            Action::TaskAdded(task.clone()),
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(task)
    }

    pub async fn remove_task(&self, todolist_id: Uuid, task_id: Uuid) -> Result<(), OperationError> {
        debug!(%todolist_id, %task_id, "removing task");
        self.set_status(RequestStatus::Loading).await;
        let request = Ok(self.client.build_delete_task(todolist_id, task_id));
        let envelope = self
            .call(request, |c, r| c.parse_delete_task(r), true)
            .await?;
        self.expect_success(envelope, true).await?;

        self.dispatch_all(vec![
            Action::TaskRemoved {
                todolist_id,
                task_id,
            },
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(())
    }

    /// Apply `patch` to a task.
    ///
    /// The server wants the complete record, so the patch is merged onto the
    /// locally stored task first. A task that is not in local state fails
    /// before any request is sent.
    pub async fn update_task(
        &self,
        todolist_id: Uuid,
        task_id: Uuid,
        patch: UpdateTaskPatch,
    ) -> Result<(), OperationError> {
        let current = self
            .state
            .read()
            .await
            .tasks
            .find(todolist_id, task_id)
            .cloned();
        let Some(current) = current else {
            warn!(%todolist_id, %task_id, "task to update is not in local state");
            self.set_status(RequestStatus::Failed).await;
            return Err(OperationError::TaskNotFound {
                todolist_id,
                task_id,
            });
        };

        debug!(%todolist_id, %task_id, "updating task");
        self.set_status(RequestStatus::Loading).await;
        let model = patch.merge_onto(&current);
        let request = self.client.build_update_task(todolist_id, task_id, &model);
        let envelope = self
            .call(request, |c, r| c.parse_update_task(r), true)
            .await?;
        self.expect_success(envelope, true).await?;

        self.dispatch_all(vec![
            Action::TaskUpdated {
                todolist_id,
                task_id,
                patch,
            },
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use crate::action::Action;
    use crate::client::TodolistsClient;
    use crate::error::{ApiError, OperationError};
    use crate::state::RequestStatus;
    use crate::store::testing::{
        ok, rejected, task, todolist, with_state_in_flight, ScriptedTransport,
    };
    use crate::store::Store;
    use crate::types::{TaskPriority, TaskStatus, UpdateTaskPatch};

    const LIST: u128 = 0xA;

    async fn store_with_list() -> Store<ScriptedTransport> {
        let store = Store::new(
            TodolistsClient::new("http://api.test"),
            ScriptedTransport::default(),
        );
        store.dispatch(Action::TodolistsFetched(vec![todolist(LIST, "Work")])).await;
        store
    }

    #[tokio::test]
    async fn fetch_replaces_list_tasks() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        store.dispatch(Action::TaskAdded(task(1, list, "old"))).await;
        store.transport.push_json(json!({
            "items": [task(2, list, "new a"), task(3, list, "new b")],
            "totalCount": 2,
            "error": null
        }));

        store.fetch_tasks(list).await.unwrap();

        let state = store.state().await;
        let titles: Vec<_> = state
            .tasks
            .get(list)
            .unwrap()
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, ["new a", "new b"]);
        assert_eq!(state.app.status, RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn fetch_with_error_field_is_rejected() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        store.transport.push_json(json!({
            "items": [],
            "totalCount": 0,
            "error": "Todolist not found"
        }));

        let err = store.fetch_tasks(list).await.unwrap_err();
        assert_eq!(err.to_string(), "Todolist not found");
        assert_eq!(
            store.state().await.app.error.as_deref(),
            Some("Todolist not found")
        );
    }

    #[tokio::test]
    async fn add_then_remove_round_trip() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        let created = task(7, list, "Buy milk");
        store
            .transport
            .push_json(ok(json!({ "item": created.clone() })));

        store.add_task("Buy milk", list).await.unwrap();
        let state = store.state().await;
        assert_eq!(state.tasks.get(list).unwrap(), [created.clone()]);

        store.transport.push_json(ok(json!({})));
        store.remove_task(list, created.id).await.unwrap();
        let state = store.state().await;
        assert_eq!(state.tasks.get(list), Some(&[][..]));
    }

    #[tokio::test]
    async fn add_inserts_at_front() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        store.dispatch(Action::TaskAdded(task(1, list, "existing"))).await;
        store
            .transport
            .push_json(ok(json!({ "item": task(2, list, "fresh") })));

        store.add_task("fresh", list).await.unwrap();

        let state = store.state().await;
        let tasks = state.tasks.get(list).unwrap();
        assert_eq!(tasks[0].title, "fresh");
        assert_eq!(tasks[1].title, "existing");
    }

    #[tokio::test]
    async fn remove_network_failure_keeps_task() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        store.dispatch(Action::TaskAdded(task(1, list, "keep"))).await;
        store
            .transport
            .push_error(ApiError::HttpError {
                status: 500,
                body: "boom".to_string(),
            });

        let err = store.remove_task(list, Uuid::from_u128(1)).await.unwrap_err();
        assert!(matches!(err, OperationError::Network(_)));

        let state = store.state().await;
        assert_eq!(state.tasks.get(list).unwrap().len(), 1);
        assert_eq!(state.app.status, RequestStatus::Failed);
        assert_eq!(state.app.error.as_deref(), Some("HTTP 500: boom"));
    }

    #[tokio::test]
    async fn update_sends_full_model_and_patches_state() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        let mut existing = task(1, list, "Report");
        existing.description = Some("Q1 numbers".to_string());
        store.dispatch(Action::TaskAdded(existing.clone())).await;
        store
            .transport
            .push_json(ok(json!({ "item": existing.clone() })));

        let patch = UpdateTaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        store.update_task(list, existing.id, patch).await.unwrap();

        let body: serde_json::Value =
            serde_json::from_str(store.transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Report",
                "description": "Q1 numbers",
                "status": 2,
                "priority": 0,
                "startDate": null,
                "deadline": null
            })
        );

        let state = store.state().await;
        let stored = state.tasks.find(list, existing.id).unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert_eq!(stored.priority, TaskPriority::Low);
    }

    #[tokio::test]
    async fn update_of_unknown_task_sends_nothing() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        store.dispatch(Action::TaskAdded(task(1, list, "present"))).await;
        let before = store.state().await;

        let err = store
            .update_task(list, Uuid::from_u128(99), UpdateTaskPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::TaskNotFound { .. }));
        assert!(store.transport.requests().is_empty());

        let after = store.state().await;
        assert_eq!(after.tasks, before.tasks);
        assert_eq!(after.todolists, before.todolists);
        assert_eq!(after.app.status, RequestStatus::Failed);
        assert!(after.app.error.is_none());
    }

    #[tokio::test]
    async fn update_rejected_leaves_task_unchanged() {
        let store = store_with_list().await;
        let list = Uuid::from_u128(LIST);
        store.dispatch(Action::TaskAdded(task(1, list, "Report"))).await;
        store.transport.push_json(rejected(&["Title too long"]));

        let patch = UpdateTaskPatch {
            title: Some("x".repeat(200)),
            ..Default::default()
        };
        store
            .update_task(list, Uuid::from_u128(1), patch)
            .await
            .unwrap_err();

        let state = store.state().await;
        assert_eq!(state.tasks.find(list, Uuid::from_u128(1)).unwrap().title, "Report");
        assert_eq!(state.app.error.as_deref(), Some("Title too long"));
    }

    #[tokio::test]
    async fn task_requests_run_under_loading_status() {
        let (transport, gate) = ScriptedTransport::gated();
        let store = Store::new(TodolistsClient::new("http://api.test"), transport);
        let list = Uuid::from_u128(LIST);
        store.dispatch(Action::TodolistsFetched(vec![todolist(LIST, "Work")])).await;

        store.transport.push_json(json!({
            "items": [task(1, list, "Report")],
            "totalCount": 1,
            "error": null
        }));
        let (result, during) = with_state_in_flight(&store, &gate, store.fetch_tasks(list)).await;
        result.unwrap();
        assert_eq!(during.app.status, RequestStatus::Loading);
        assert_eq!(during.tasks.get(list), Some(&[][..]));

        store
            .transport
            .push_json(ok(json!({ "item": task(2, list, "Review") })));
        let (result, during) =
            with_state_in_flight(&store, &gate, store.add_task("Review", list)).await;
        result.unwrap();
        assert_eq!(during.app.status, RequestStatus::Loading);

        let patch = UpdateTaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        store
            .transport
            .push_json(ok(json!({ "item": task(1, list, "Report") })));
        let (result, during) =
            with_state_in_flight(&store, &gate, store.update_task(list, Uuid::from_u128(1), patch))
                .await;
        result.unwrap();
        assert_eq!(during.app.status, RequestStatus::Loading);
        assert_eq!(
            during.tasks.find(list, Uuid::from_u128(1)).unwrap().status,
            TaskStatus::New
        );

        store.transport.push_json(ok(json!({})));
        let (result, during) =
            with_state_in_flight(&store, &gate, store.remove_task(list, Uuid::from_u128(2))).await;
        result.unwrap();
        assert_eq!(during.app.status, RequestStatus::Loading);
        assert_eq!(during.tasks.get(list).unwrap().len(), 2);

        let after = store.state().await;
        assert_eq!(after.app.status, RequestStatus::Succeeded);
        assert_eq!(after.tasks.get(list).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn task_added_after_its_list_was_removed_is_dropped() {
        let (transport, gate) = ScriptedTransport::gated();
        let store = Store::new(TodolistsClient::new("http://api.test"), transport);
        let list = Uuid::from_u128(LIST);
        store.dispatch(Action::TodolistsFetched(vec![todolist(LIST, "Work")])).await;
        store
            .transport
            .push_json(ok(json!({ "item": task(1, list, "Late") })));

        let remove_while_pending = async {
            gate.wait_entered().await;
            store.dispatch(Action::TodolistRemoved(list)).await;
            gate.release();
        };
        let (result, ()) = tokio::join!(store.add_task("Late", list), remove_while_pending);
        result.unwrap();

        let state = store.state().await;
        assert!(state.todolists.items.is_empty());
        assert!(state.tasks.by_todolist.is_empty());
    }
}
