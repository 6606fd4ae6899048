/// Backend API client
///
/// The backend owns accounts, subscriptions, profiles and the catalog. The edge
/// server talks to it for the few calls that produce session cookies, and
/// otherwise relays `/api/*` traffic unchanged.
use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Credentials posted to the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    session_id: &'a str,
}

/// Client headers passed through to the backend
pub const FORWARDED_REQUEST_HEADERS: &[HeaderName] = &[
    header::CONTENT_TYPE,
    header::ACCEPT,
    header::ACCEPT_LANGUAGE,
    header::RANGE,
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
];

/// Backend headers passed back to the client. Cookies stay with the edge.
pub const RELAYED_RESPONSE_HEADERS: &[HeaderName] = &[
    header::CONTENT_TYPE,
    header::CACHE_CONTROL,
    header::LOCATION,
    header::CONTENT_DISPOSITION,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::ETAG,
    header::LAST_MODIFIED,
];

/// Copies the headers named in `allowed` out of `headers`
pub fn allowed_headers(headers: &HeaderMap, allowed: &[HeaderName]) -> HeaderMap {
    let mut kept = HeaderMap::new();
    for name in allowed {
        for value in headers.get_all(name) {
            kept.append(name.clone(), value.clone());
        }
    }
    kept
}

/// A request relayed to the backend as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedRequest {
    pub method: Method,
    /// Path below the backend base URL, starting with `/`
    pub path: String,
    pub query: Option<String>,
    /// Already narrowed to [`FORWARDED_REQUEST_HEADERS`]
    pub headers: HeaderMap,
    pub bearer: Option<String>,
    pub body: Bytes,
}

/// The backend's answer to a [`ForwardedRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    /// Narrowed to [`RELAYED_RESPONSE_HEADERS`]
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Seam over the backend API
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Exchanges email and password for an access token
    async fn login(&self, request: &LoginRequest) -> AppResult<String>;

    /// Confirms a completed checkout and returns a refreshed access token
    async fn verify_subscription(&self, bearer: &str, session_id: &str) -> AppResult<String>;

    /// Relays an arbitrary API call
    async fn forward(&self, request: ForwardedRequest) -> AppResult<ForwardedResponse>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// [`Backend`] over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    http_client: HttpClient,
    api_url: String,
}

impl HttpBackend {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Reads `{"accessToken": ...}` from a 2xx answer, or turns the answer into an error
    async fn read_token(response: reqwest::Response) -> AppResult<String> {
        let status = response.status();
        if !status.is_success() {
            let message = upstream_message(response).await;
            tracing::warn!(status = %status, message = %message, "Backend rejected session call");
            return Err(AppError::Upstream { status, message });
        }

        let body: TokenResponse = response.json().await?;
        Ok(body.access_token)
    }
}

/// Pulls a human-readable message out of an error body
async fn upstream_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(text)
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;

        Self::read_token(response).await
    }

    async fn verify_subscription(&self, bearer: &str, session_id: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.url("/subscriptions/verify"))
            .bearer_auth(bearer)
            .json(&VerifyRequest { session_id })
            .send()
            .await?;

        Self::read_token(response).await
    }

    async fn forward(&self, request: ForwardedRequest) -> AppResult<ForwardedResponse> {
        let mut url = self.url(&request.path);
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .headers(allowed_headers(&request.headers, FORWARDED_REQUEST_HEADERS));
        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = allowed_headers(response.headers(), RELAYED_RESPONSE_HEADERS);
        let body = response.bytes().await?;

        tracing::debug!(
            backend = self.name(),
            path = %request.path,
            status = %status,
            "Forwarded API call"
        );

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
