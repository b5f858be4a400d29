//! Stateless HTTP request builder and response parser for the todolist API.
//!
//! # Design
//! `TodolistsClient` holds only the base URL and the optional API key. Each
//! endpoint is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. Parsing stops at
//! the envelope: interpreting the result code is the store's job.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateTask, CreateTodolist, EmptyData, FieldError, GetTasksResponse, ItemData, LoginData,
    LoginParams, MeData, ResponseEnvelope, ResultCode, Task, Todolist, UpdateTaskModel,
    UpdateTodolistTitle,
};

pub const API_KEY_HEADER: &str = "API-KEY";

/// Synchronous, stateless client for the todolist API.
#[derive(Debug, Clone)]
pub struct TodolistsClient {
    base_url: String,
    api_key: Option<String>,
}

impl TodolistsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut client = Self::new(&config.base_url);
        client.api_key = config.api_key.clone();
        client
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    // -- todolists --------------------------------------------------------

    pub fn build_get_todolists(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "todo-lists".to_string())
    }

    pub fn build_create_todolist(&self, input: &CreateTodolist) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Post, "todo-lists".to_string(), input)
    }

    pub fn build_update_todolist(
        &self,
        id: Uuid,
        input: &UpdateTodolistTitle,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Put, format!("todo-lists/{id}"), input)
    }

    pub fn build_delete_todolist(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("todo-lists/{id}"))
    }

    pub fn parse_get_todolists(&self, response: HttpResponse) -> Result<Vec<Todolist>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_todolist(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<ItemData<Todolist>>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_update_todolist(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<EmptyData>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_delete_todolist(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<EmptyData>, ApiError> {
        parse_envelope(response)
    }

    // -- tasks ------------------------------------------------------------

    pub fn build_get_tasks(&self, todolist_id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Get, format!("todo-lists/{todolist_id}/tasks"))
    }

    pub fn build_create_task(
        &self,
        todolist_id: Uuid,
        input: &CreateTask,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Post,
            format!("todo-lists/{todolist_id}/tasks"),
            input,
        )
    }

    pub fn build_update_task(
        &self,
        todolist_id: Uuid,
        task_id: Uuid,
        model: &UpdateTaskModel,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            HttpMethod::Put,
            format!("todo-lists/{todolist_id}/tasks/{task_id}"),
            model,
        )
    }

    pub fn build_delete_task(&self, todolist_id: Uuid, task_id: Uuid) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            format!("todo-lists/{todolist_id}/tasks/{task_id}"),
        )
    }

    pub fn parse_get_tasks(&self, response: HttpResponse) -> Result<GetTasksResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_task(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<ItemData<Task>>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_update_task(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<ItemData<Task>>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_delete_task(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<EmptyData>, ApiError> {
        parse_envelope(response)
    }

    // -- auth -------------------------------------------------------------

    pub fn build_login(&self, params: &LoginParams) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Post, "auth/login".to_string(), params)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Delete, "auth/login".to_string())
    }

    pub fn build_me(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "auth/me".to_string())
    }

    pub fn parse_login(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<LoginData>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_logout(
        &self,
        response: HttpResponse,
    ) -> Result<ResponseEnvelope<EmptyData>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_me(&self, response: HttpResponse) -> Result<ResponseEnvelope<MeData>, ApiError> {
        parse_envelope(response)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(key) = &self.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        HttpRequest {
            method,
            path: format!("{}/{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn request_with_body<B: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut request = self.request(method, path);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    result_code: ResultCode,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    fields_errors: Vec<FieldError>,
    #[serde(default)]
    data: serde_json::Value,
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response, 200)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_envelope<D: DeserializeOwned>(
    response: HttpResponse,
) -> Result<ResponseEnvelope<D>, ApiError> {
    let raw: RawEnvelope = parse_json(response)?;
    let data = if raw.result_code.is_success() {
        // a missing `data` on success is read as an empty object
        let value = match raw.data {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            value => value,
        };
        let data = serde_json::from_value(value)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Some(data)
    } else {
        None
    };
    Ok(ResponseEnvelope {
        result_code: raw.result_code,
        messages: raw.messages,
        fields_errors: raw.fields_errors,
        data,
    })
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodolistsClient {
        TodolistsClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_get_todolists_produces_correct_request() {
        let req = client().build_get_todolists();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todo-lists");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_todolist_sends_json_title() {
        let input = CreateTodolist {
            title: "Work".to_string(),
        };
        let req = client().build_create_todolist(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Work");
    }

    #[test]
    fn build_task_paths_nest_under_todolist() {
        let list = Uuid::nil();
        let task = Uuid::from_u128(1);
        let req = client().build_delete_task(list, task);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(
            req.path,
            "http://localhost:3000/todo-lists/00000000-0000-0000-0000-000000000000/tasks/00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn logout_deletes_login_resource() {
        let req = client().build_logout();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/auth/login");
    }

    #[test]
    fn api_key_is_attached_to_every_request() {
        let c = client().with_api_key("secret-key");
        let req = c.build_me();
        assert_eq!(
            req.headers,
            vec![(API_KEY_HEADER.to_string(), "secret-key".to_string())]
        );
        let req = c
            .build_create_task(Uuid::nil(), &CreateTask { title: "t".to_string() })
            .unwrap();
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.headers[0].0, API_KEY_HEADER);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodolistsClient::new("http://localhost:3000/");
        let req = client.build_get_todolists();
        assert_eq!(req.path, "http://localhost:3000/todo-lists");
    }

    #[test]
    fn parse_envelope_success_decodes_data() {
        let body = r#"{"resultCode":0,"messages":[],"fieldsErrors":[],"data":{"item":{"id":"00000000-0000-0000-0000-000000000001","title":"Work","addedDate":"2024-01-01T00:00:00","order":0}}}"#;
        let envelope = client().parse_create_todolist(response(200, body)).unwrap();
        assert_eq!(envelope.result_code, ResultCode::Success);
        assert_eq!(envelope.data.unwrap().item.title, "Work");
    }

    #[test]
    fn parse_envelope_failure_skips_data() {
        let body = r#"{"resultCode":1,"messages":["Title is required"],"fieldsErrors":[],"data":{}}"#;
        let envelope = client().parse_create_todolist(response(200, body)).unwrap();
        assert_eq!(envelope.result_code, ResultCode::Error);
        assert_eq!(envelope.messages, vec!["Title is required".to_string()]);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn parse_envelope_with_bad_success_data_fails() {
        let body = r#"{"resultCode":0,"messages":[],"data":{}}"#;
        let err = client().parse_create_task(response(200, body)).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_get_tasks_reads_items() {
        let body = r#"{"items":[],"totalCount":0,"error":null}"#;
        let tasks = client().parse_get_tasks(response(200, body)).unwrap();
        assert!(tasks.items.is_empty());
        assert!(tasks.error.is_none());
    }

    #[test]
    fn parse_not_found() {
        let err = client().parse_delete_todolist(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_unexpected_status() {
        let err = client()
            .parse_get_todolists(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_bad_json() {
        let err = client().parse_get_todolists(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
