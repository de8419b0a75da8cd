//! HttpRemoteClient - REST implementation of the task API contract.
//!
//! Talks JSON over HTTP with `reqwest`. Every task call carries the caller's
//! credential as a bearer token; responses are validated through the DTOs in
//! [`crate::dto`] before they become domain values.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use tasklane_core::auth::{Credential, LoginRequest, LoginResponse, RegisterRequest};
use tasklane_core::config::ClientConfig;
use tasklane_core::remote::RemoteClient;
use tasklane_core::task::{NewTask, Task, TaskPatch};
use tasklane_core::user::UserProfile;
use tasklane_core::{Result, TasklaneError};

use crate::dto::{ErrorEnvelope, LoginResponseDto, TaskDto, UserProfileDto};

const REGISTER_PATH: &[&str] = &["api", "auth", "register"];
const LOGIN_PATH: &[&str] = &["api", "auth", "login"];
const TODOS_PATH: &[&str] = &["api", "todos"];

/// Remote client backed by `reqwest`.
#[derive(Clone)]
pub struct HttpRemoteClient {
    client: Client,
    base_url: Url,
}

impl HttpRemoteClient {
    /// Creates a client for `base_url` with the given per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TasklaneError::config(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(base_url, client)
    }

    /// Creates a client around a preconfigured `reqwest::Client`.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TasklaneError::config(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TasklaneError::config(format!(
                "API URL '{}' cannot carry paths",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Creates a client from the resolved configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an endpoint URL below the base URL.
    ///
    /// Each segment is percent-encoded, so an id can never escape its slot.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TasklaneError::config("API URL cannot carry paths"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn task_endpoint(&self, id: &str) -> Result<Url> {
        let mut segments: Vec<&str> = TODOS_PATH.to_vec();
        segments.push(id);
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url, credential: Option<&Credential>) -> RequestBuilder {
        debug!(%method, %url, authenticated = credential.is_some(), "API request");

        let request = self.client.request(method, url);
        match credential {
            Some(credential) => request.header(reqwest::header::AUTHORIZATION, credential.bearer()),
            None => request,
        }
    }

    /// Sends the request and turns anything but a 2xx into a typed error.
    ///
    /// `task_id` names the addressed task so a 404 can say which one.
    async fn execute(&self, request: RequestBuilder, task_id: Option<&str>) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify_failure(status, &body, task_id);
        debug!(%status, kind = %error.kind(), "API request failed");
        Err(error)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| TasklaneError::malformed(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> TasklaneError {
    if err.is_timeout() {
        TasklaneError::network(format!("request timed out: {}", err))
    } else {
        TasklaneError::network(err.to_string())
    }
}

/// Maps a non-2xx status and its body onto the error taxonomy.
pub(crate) fn classify_failure(
    status: StatusCode,
    body: &str,
    task_id: Option<&str>,
) -> TasklaneError {
    let message = ErrorEnvelope::message_from(body);
    let code = status.as_u16();

    match code {
        401 | 403 => TasklaneError::auth(code, message),
        404 => TasklaneError::NotFound {
            entity_type: if task_id.is_some() { "Task" } else { "Endpoint" },
            id: task_id.unwrap_or_default().to_string(),
            message,
        },
        400..=499 => TasklaneError::Validation {
            status: Some(code),
            message,
        },
        _ => TasklaneError::Server {
            status: Some(code),
            message,
        },
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn register(&self, payload: &RegisterRequest) -> Result<UserProfile> {
        let url = self.endpoint(REGISTER_PATH)?;
        let request = self.request(Method::POST, url, None).json(payload);
        let response = self.execute(request, None).await?;

        Self::read_json::<UserProfileDto>(response).await?.try_into()
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        let url = self.endpoint(LOGIN_PATH)?;
        let request = self.request(Method::POST, url, None).json(credentials);
        let response = self.execute(request, None).await?;

        Self::read_json::<LoginResponseDto>(response).await?.try_into()
    }

    async fn list_tasks(&self, credential: Option<&Credential>) -> Result<Vec<Task>> {
        let url = self.endpoint(TODOS_PATH)?;
        let response = self
            .execute(self.request(Method::GET, url, credential), None)
            .await?;

        Self::read_json::<Vec<TaskDto>>(response)
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    async fn create_task(&self, credential: Option<&Credential>, fields: &NewTask) -> Result<Task> {
        let url = self.endpoint(TODOS_PATH)?;
        let request = self.request(Method::POST, url, credential).json(fields);
        let response = self.execute(request, None).await?;

        Self::read_json::<TaskDto>(response).await?.try_into()
    }

    async fn update_task(
        &self,
        credential: Option<&Credential>,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task> {
        let url = self.task_endpoint(id)?;
        let request = self.request(Method::PUT, url, credential).json(patch);
        let response = self.execute(request, Some(id)).await?;

        Self::read_json::<TaskDto>(response).await?.try_into()
    }

    async fn delete_task(&self, credential: Option<&Credential>, id: &str) -> Result<()> {
        let url = self.task_endpoint(id)?;
        self.execute(self.request(Method::DELETE, url, credential), Some(id))
            .await?;
        Ok(())
    }
}
