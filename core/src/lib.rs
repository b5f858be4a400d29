//! Client-side state core for the todolist service.
//!
//! # Overview
//! Mirrors a remote todolist API into local view state: todolists, their
//! tasks, the auth flag, and a global request status. Callers drive it through
//! async operations on [`Store`] and read snapshots with [`Store::state`].
//!
//! # Design
//! - `TodolistsClient` builds `HttpRequest`s and parses `HttpResponse`s
//!   without I/O; a [`Transport`] executes them.
//! - Every state change is an [`Action`] applied by the pure
//!   [`reducer::reduce`]; cross-slice cascades are explicit there.
//! - Operations return `Result<_, OperationError>` and also record the
//!   outcome in the app slice for UI progress and error banners.

pub mod action;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod reducer;
pub mod state;
pub mod store;
pub mod types;

pub use action::Action;
pub use client::TodolistsClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, OperationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use state::{FilterValue, RequestStatus, RootState, TodolistDomain};
pub use store::Store;
pub use types::{
    LoginParams, Task, TaskPriority, TaskStatus, Todolist, UpdateTaskModel, UpdateTaskPatch,
};
