//! HTTP client for the job control endpoint.
//!
//! Every action is a `GET <base>/environment/<env>/job/<job>/?action=<action>`
//! answered with a JSON [`JobResponse`]. The endpoint only answers JSON to
//! ajax requests, so each call carries `X-Requested-With: XMLHttpRequest`.

use jobwatch_core::{JobwatchError, StatusSource};
use jobwatch_types::{JobAction, JobRef, JobResponse};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use tracing::debug;

const REQUESTED_WITH: &str = "X-Requested-With";

/// HTTP client for one job web application.
pub struct JobApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the job API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("Job API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The configured cookie is not a valid header value.
    #[error("Invalid cookie header: {0}")]
    InvalidCookie(#[from] reqwest::header::InvalidHeaderValue),
}

impl JobApi {
    /// Create a client. `cookie` is sent verbatim as the `Cookie` header.
    pub fn new(base_url: impl Into<String>, cookie: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        if let Some(cookie) = cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn job_url(&self, job: &JobRef) -> String {
        format!("{}/environment/{}/job/{}/", self.base_url, job.env_id, job.job_id)
    }

    pub async fn start_job(&self, job: &JobRef) -> Result<JobResponse, ApiError> {
        self.send(job, JobAction::StartJob).await
    }

    pub async fn stop_job(&self, job: &JobRef) -> Result<JobResponse, ApiError> {
        self.send(job, JobAction::StopJob).await
    }

    pub async fn status(&self, job: &JobRef) -> Result<JobResponse, ApiError> {
        self.send(job, JobAction::CheckStatus).await
    }

    /// Send one action and decode the response.
    pub async fn send(&self, job: &JobRef, action: JobAction) -> Result<JobResponse, ApiError> {
        debug!(target: "jobwatch::api", "Sending {} for job {}", action, job);

        let response = self
            .client
            .get(self.job_url(job))
            .query(&[("action", action.as_str())])
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.json::<JobResponse>().await?)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl StatusSource for JobApi {
    async fn check_status(&self, job: &JobRef) -> jobwatch_core::Result<JobResponse> {
        self.status(job)
            .await
            .map_err(|e| JobwatchError::StatusQuery(e.to_string()))
    }
}
