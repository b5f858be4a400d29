//! Error types for the todolist client.
//!
//! # Design
//! `ApiError` covers everything that can go wrong below the result-code
//! layer: building a request, moving it over the wire, or decoding what came
//! back. `OperationError` is what store operations return and mirrors the
//! three failure kinds a caller can observe: the server said no, the exchange
//! itself failed, or a local precondition did not hold.

use thiserror::Error;
use uuid::Uuid;

/// Fallback message used when neither the server nor the transport supplied one.
pub const DEFAULT_ERROR_MESSAGE: &str = "Some error occurred";

/// Errors returned by `TodolistsClient` and `Transport` implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the expected one (or 404).
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
}

/// Outcome of a failed store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The server answered with a non-zero result code.
    #[error("{}", .messages.first().map(String::as_str).unwrap_or(DEFAULT_ERROR_MESSAGE))]
    Rejected {
        result_code: i32,
        messages: Vec<String>,
    },

    /// The exchange with the server failed.
    #[error("network error: {0}")]
    Network(#[from] ApiError),

    /// `update_task` was asked to patch a task that is not in local state.
    #[error("task {task_id} not found in todolist {todolist_id}")]
    TaskNotFound { todolist_id: Uuid, task_id: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_displays_first_message() {
        let err = OperationError::Rejected {
            result_code: 1,
            messages: vec!["wrong password".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "wrong password");
    }

    #[test]
    fn rejected_without_messages_uses_fallback() {
        let err = OperationError::Rejected {
            result_code: 1,
            messages: Vec::new(),
        };
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn transport_error_displays_raw_message() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }
}
