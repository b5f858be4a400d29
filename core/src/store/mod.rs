//! The store: current state, the reducer, and the async operations.
//!
//! # Design
//! `Store` owns a `TodolistsClient` for building and parsing requests, a
//! `Transport` for executing them, and the `RootState` behind an async
//! `RwLock`. Operations follow one shape:
//!
//! 1. dispatch `SetAppStatus(Loading)`,
//! 2. build the request, execute it, parse the response,
//! 3. check the result code,
//! 4. dispatch the mutation and `SetAppStatus(Succeeded)`.
//!
//! Any failure in 2 or 3 goes through the handlers in [`crate::handlers`] and
//! comes back to the caller as an `OperationError`. The state lock is only
//! taken to read or reduce, never across a network await, so concurrent
//! operations interleave freely and the last response to arrive wins.

mod auth;
mod tasks;
mod todolists;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::action::Action;
use crate::client::TodolistsClient;
use crate::error::{ApiError, OperationError};
use crate::handlers::{app_error_actions, handle_server_app_error, handle_server_network_error};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::reducer::reduce;
use crate::state::{RequestStatus, RootState};
use crate::types::ResponseEnvelope;

/// Application state plus the operations that keep it in sync with the server.
pub struct Store<T> {
    client: TodolistsClient,
    transport: T,
    state: RwLock<RootState>,
}

impl<T: Transport> Store<T> {
    pub fn new(client: TodolistsClient, transport: T) -> Self {
        Self::with_state(client, transport, RootState::default())
    }

    /// Start from an existing snapshot, e.g. one restored by the UI layer.
    pub fn with_state(client: TodolistsClient, transport: T, state: RootState) -> Self {
        Self {
            client,
            transport,
            state: RwLock::new(state),
        }
    }

    /// A copy of the current state.
    pub async fn state(&self) -> RootState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: Action) {
        debug!(?action, "dispatch");
        let mut state = self.state.write().await;
        reduce(&mut state, &action);
    }

    /// Apply several actions under one lock so readers never see a partial
    /// cascade.
    pub async fn dispatch_all(&self, actions: Vec<Action>) {
        let mut state = self.state.write().await;
        for action in &actions {
            debug!(?action, "dispatch");
            reduce(&mut state, action);
        }
    }

    async fn set_status(&self, status: RequestStatus) {
        self.dispatch(Action::SetAppStatus(status)).await;
    }

    /// Execute `request` and decode the response with `parse`.
    ///
    /// Transport and decoding failures are reported through the network
    /// handler. With `show_global_error` off only the status changes.
    async fn call<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&TodolistsClient, HttpResponse) -> Result<R, ApiError>,
        show_global_error: bool,
    ) -> Result<R, OperationError> {
        let result = match request {
            Ok(request) => {
                debug!(method = ?request.method, path = %request.path, "sending request");
                match self.transport.execute(request).await {
                    Ok(response) => parse(&self.client, response),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "request failed");
                let actions = if show_global_error {
                    handle_server_network_error(&e)
                } else {
                    vec![Action::SetAppStatus(RequestStatus::Failed)]
                };
                self.dispatch_all(actions).await;
                Err(OperationError::Network(e))
            }
        }
    }

    /// Unwrap a successful envelope or report it through the app-error
    /// handler.
    async fn expect_success<D>(
        &self,
        envelope: ResponseEnvelope<D>,
        show_global_error: bool,
    ) -> Result<D, OperationError> {
        let actions = handle_server_app_error(&envelope, show_global_error);
        match envelope.data {
            Some(data) if envelope.result_code.is_success() => Ok(data),
            _ => {
                warn!(
                    result_code = i32::from(envelope.result_code),
                    messages = ?envelope.messages,
                    "server rejected request"
                );
                self.dispatch_all(actions).await;
                Err(OperationError::Rejected {
                    result_code: envelope.result_code.into(),
                    messages: envelope.messages,
                })
            }
        }
    }

    /// Report a failure that only carries messages, such as the `error` field
    /// of the tasks listing.
    async fn reject(&self, result_code: i32, messages: Vec<String>) -> OperationError {
        warn!(result_code, ?messages, "server rejected request");
        self.dispatch_all(app_error_actions(&messages, true)).await;
        OperationError::Rejected {
            result_code,
            messages,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport shared by the operation tests.

    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use super::Store;
    use crate::error::ApiError;
    use crate::http::{HttpRequest, HttpResponse, Transport};
    use crate::state::RootState;
    use crate::types::{Task, TaskPriority, TaskStatus, Todolist};

    /// Holds every request inside `execute` until the test releases it.
    #[derive(Default)]
    pub struct Gate {
        entered: Notify,
        released: Notify,
    }

    impl Gate {
        pub async fn wait_entered(&self) {
            self.entered.notified().await;
        }

        pub fn release(&self) {
            self.released.notify_one();
        }
    }

    /// Replays queued responses in order and records every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
        requests: Mutex<Vec<HttpRequest>>,
        gate: Option<Arc<Gate>>,
    }

    impl ScriptedTransport {
        pub fn gated() -> (Self, Arc<Gate>) {
            let gate = Arc::new(Gate::default());
            let transport = Self {
                gate: Some(gate.clone()),
                ..Self::default()
            };
            (transport, gate)
        }

        pub fn push_json(&self, body: serde_json::Value) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(HttpResponse::ok(body.to_string())));
        }

        pub fn push_error(&self, error: ApiError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request);
            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.released.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
        }
    }

    /// Run `operation` against a gated store and return its result together
    /// with the state observed while its request was held.
    pub async fn with_state_in_flight<R>(
        store: &Store<ScriptedTransport>,
        gate: &Gate,
        operation: impl Future<Output = R>,
    ) -> (R, RootState) {
        let observe = async {
            gate.wait_entered().await;
            let state = store.state().await;
            gate.release();
            state
        };
        tokio::join!(operation, observe)
    }

    pub fn ok(data: serde_json::Value) -> serde_json::Value {
        json!({ "resultCode": 0, "messages": [], "fieldsErrors": [], "data": data })
    }

    pub fn rejected(messages: &[&str]) -> serde_json::Value {
        json!({ "resultCode": 1, "messages": messages, "fieldsErrors": [], "data": {} })
    }

    pub fn todolist(n: u128, title: &str) -> Todolist {
        Todolist {
            id: Uuid::from_u128(n),
            title: title.to_string(),
            added_date: "2024-01-01T00:00:00".to_string(),
            order: 0,
            owner_id: None,
        }
    }

    pub fn task(n: u128, todolist_id: Uuid, title: &str) -> Task {
        Task {
            id: Uuid::from_u128(n),
            title: title.to_string(),
            description: None,
            todo_list_id: todolist_id,
            order: 0,
            status: TaskStatus::New,
            priority: TaskPriority::Low,
            start_date: None,
            deadline: None,
            added_date: "2024-01-01T00:00:00".to_string(),
        }
    }
}
