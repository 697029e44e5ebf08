use std::fmt;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Public Border0 API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.border0.com/api/v1";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Errors returned by [`ApiClient`] calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error (500): {0}")]
    Server(String),

    #[error("API request failed with status code {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid API url {0:?}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// How requests authenticate against the API.
#[derive(Clone)]
pub enum Credentials {
    /// `Authorization: Bearer <token>` (admin and connector tokens).
    Bearer(String),
    /// `x-access-token: <token>` (session log exports).
    AccessToken(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer([redacted])"),
            Self::AccessToken(_) => f.write_str("AccessToken([redacted])"),
        }
    }
}

/// Thin JSON client for the Border0 REST API.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, credentials, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match &self.credentials {
            Credentials::Bearer(token) => req.bearer_auth(token),
            Credentials::AccessToken(token) => req.header(ACCESS_TOKEN_HEADER, token),
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let req = self.request(Method::GET, self.endpoint(segments)).query(query);
        let body = send(req, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        self.post_json_expecting(segments, body, None).await
    }

    /// Like [`Self::post_json`] but only accepts one specific success status.
    pub(crate) async fn post_json_expecting<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        expected: Option<StatusCode>,
    ) -> Result<T, ApiError> {
        let req = self.request(Method::POST, self.endpoint(segments)).json(body);
        let body = send(req, expected).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, self.endpoint(segments));
        send(req, None).await?;
        Ok(())
    }
}

async fn send(req: RequestBuilder, expected: Option<StatusCode>) -> Result<String, ApiError> {
    let response = req.send().await?;
    let status = response.status();
    let body = response.text().await?;
    tracing::debug!(%status, bytes = body.len(), "api response");
    check_status(status, body, expected)
}

fn check_status(
    status: StatusCode,
    body: String,
    expected: Option<StatusCode>,
) -> Result<String, ApiError> {
    match status {
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(body)),
        StatusCode::INTERNAL_SERVER_ERROR => Err(ApiError::Server(body)),
        s if s.is_success() && expected.map_or(true, |want| want == s) => Ok(body),
        status => Err(ApiError::Status { status, body }),
    }
}
