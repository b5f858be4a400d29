//! Shared failure handling for store operations.
//!
//! Both handlers are pure: they describe the app-slice changes for a failure
//! and the store dispatches them.

use crate::action::Action;
use crate::error::{ApiError, DEFAULT_ERROR_MESSAGE};
use crate::state::RequestStatus;
use crate::types::ResponseEnvelope;

/// Actions for a response whose result code was not `Success`.
///
/// The error banner is only set when `show_global_error` is true; the status
/// always becomes `Failed`.
pub fn handle_server_app_error<D>(
    envelope: &ResponseEnvelope<D>,
    show_global_error: bool,
) -> Vec<Action> {
    app_error_actions(&envelope.messages, show_global_error)
}

/// Same as [`handle_server_app_error`] for callers that only kept the messages.
pub(crate) fn app_error_actions(messages: &[String], show_global_error: bool) -> Vec<Action> {
    let mut actions = Vec::with_capacity(2);
    if show_global_error {
        let message = messages
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        actions.push(Action::SetAppError(Some(message)));
    }
    actions.push(Action::SetAppStatus(RequestStatus::Failed));
    actions
}

/// Actions for a request that never produced a usable response.
pub fn handle_server_network_error(error: &ApiError) -> Vec<Action> {
    let message = error.to_string();
    let message = if message.is_empty() {
        DEFAULT_ERROR_MESSAGE.to_string()
    } else {
        message
    };
    vec![
        Action::SetAppError(Some(message)),
        Action::SetAppStatus(RequestStatus::Failed),
    ]
}
