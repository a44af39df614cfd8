//! Gizmo API Client
//!
//! A client for the Gizmo server, allowing task submission and status polling.

use crate::api::error::ApiError;
use crate::api::TasksApi;
use crate::consts::api::{CSRF_COOKIE, REQUEST_TIMEOUT_SECS};
use crate::cookies::read_cookie;
use crate::task::TaskStatus;
use reqwest::header::COOKIE;
use reqwest::{Client, ClientBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct SubmitRequest<'a> {
    project_name: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    /// Raw `Cookie` header captured from an authenticated session.
    cookie: String,
}

impl ApiClient {
    /// Create a new API client for the given server.
    ///
    /// `cookie` is the session cookie string; the CSRF token is read out of
    /// it and replayed as the `X-CSRFToken` header on state-changing
    /// requests.
    pub fn new(base_url: impl Into<String>, cookie: impl Into<String>) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            cookie: cookie.into(),
        }
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn csrf_token(&self) -> Option<String> {
        read_cookie(&self.cookie, CSRF_COOKIE)
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    /// POST `{"project_name": ...}` to a submit endpoint and extract the
    /// task ID from the response.
    async fn submit_task(&self, endpoint: &str, project_name: &str) -> Result<String, ApiError> {
        let url = self.build_url(endpoint);
        let response = self
            .client
            .post(&url)
            .header("X-CSRFToken", self.csrf_token().unwrap_or_default())
            .header("X-Requested-With", "XMLHttpRequest")
            .header(COOKIE, self.cookie.as_str())
            .json(&SubmitRequest { project_name })
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let body: SubmitResponse = serde_json::from_slice(&response.bytes().await?)?;

        match body.task_id {
            Some(task_id) if !task_id.is_empty() => Ok(task_id),
            _ => Err(ApiError::MissingTaskId),
        }
    }
}

#[async_trait::async_trait]
impl TasksApi for ApiClient {
    async fn start_prep(&self, project_name: &str) -> Result<String, ApiError> {
        self.submit_task("projects/prep/", project_name).await
    }

    async fn start_train_eval(&self, project_name: &str) -> Result<String, ApiError> {
        self.submit_task("projects/trainandeval/", project_name)
            .await
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let endpoint = format!("projects/task-status/{}/", urlencoding::encode(task_id));
        let url = self.build_url(&endpoint);
        let response = self
            .client
            .get(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(COOKIE, self.cookie.as_str())
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let status: TaskStatus = serde_json::from_slice(&response.bytes().await?)?;
        Ok(status)
    }
}
