use tracing::debug;
use uuid::Uuid;

use super::Store;
use crate::action::Action;
use crate::error::OperationError;
use crate::http::Transport;
use crate::state::{FilterValue, RequestStatus};
use crate::types::{CreateTodolist, Todolist, UpdateTodolistTitle};

impl<T: Transport> Store<T> {
    /// Replace every todolist with the server's list, resetting filters and
    /// entity statuses and creating an empty task array for each.
    pub async fn fetch_todolists(&self) -> Result<Vec<Todolist>, OperationError> {
        debug!("fetching todolists");
        self.set_status(RequestStatus::Loading).await;
        let request = Ok(self.client.build_get_todolists());
        let todolists = self
            .call(request, |c, r| c.parse_get_todolists(r), true)
            .await?;

        self.dispatch_all(vec![
            Action::TodolistsFetched(todolists.clone()),
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(todolists)
    }

    pub async fn add_todolist(&self, title: &str) -> Result<Todolist, OperationError> {
        debug!(title, "adding todolist");
        self.set_status(RequestStatus::Loading).await;
        let input = CreateTodolist {
            title: title.to_string(),
        };
        let request = self.client.build_create_todolist(&input);
        let envelope = self
            .call(request, |c, r| c.parse_create_todolist(r), true)
            .await?;
        let todolist = self.expect_success(envelope, true).await?.item;

        self.dispatch_all(vec![
            Action::TodolistAdded(todolist.clone()),
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(todolist)
    }

    /// Delete a todolist and its tasks.
    ///
    /// The todolist is marked `Loading` while the request is in flight and
    /// `Failed` if it does not succeed.
    pub async fn remove_todolist(&self, id: Uuid) -> Result<(), OperationError> {
        debug!(%id, "removing todolist");
        self.dispatch_all(vec![
            Action::SetAppStatus(RequestStatus::Loading),
            Action::TodolistEntityStatusChanged {
                id,
                status: RequestStatus::Loading,
            },
        ])
        .await;

        let result = self.delete_todolist(id).await;
        match &result {
            Ok(()) => {
                self.dispatch_all(vec![
                    Action::TodolistRemoved(id),
                    Action::SetAppStatus(RequestStatus::Succeeded),
                ])
                .await;
            }
            Err(_) => {
                self.change_entity_status(id, RequestStatus::Failed).await;
            }
        }
        result
    }

    async fn delete_todolist(&self, id: Uuid) -> Result<(), OperationError> {
        let request = Ok(self.client.build_delete_todolist(id));
        let envelope = self
            .call(request, |c, r| c.parse_delete_todolist(r), true)
            .await?;
        self.expect_success(envelope, true).await?;
        Ok(())
    }

    pub async fn change_todolist_title(&self, id: Uuid, title: &str) -> Result<(), OperationError> {
        debug!(%id, title, "renaming todolist");
        self.set_status(RequestStatus::Loading).await;
        let input = UpdateTodolistTitle {
            title: title.to_string(),
        };
        let request = self.client.build_update_todolist(id, &input);
        let envelope = self
            .call(request, |c, r| c.parse_update_todolist(r), true)
            .await?;
        self.expect_success(envelope, true).await?;

        self.dispatch_all(vec![
            Action::TodolistTitleChanged {
                id,
                title: title.to_string(),
            },
            Action::SetAppStatus(RequestStatus::Succeeded),
        ])
        .await;
        Ok(())
    }

    pub async fn change_filter(&self, id: Uuid, filter: FilterValue) {
        self.dispatch(Action::TodolistFilterChanged { id, filter }).await;
    }

    pub async fn change_entity_status(&self, id: Uuid, status: RequestStatus) {
        self.dispatch(Action::TodolistEntityStatusChanged { id, status })
            .await;
    }
}
