use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Response, Uri},
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppResult;
use crate::models::SessionContext;
use crate::services::backend::{allowed_headers, FORWARDED_REQUEST_HEADERS};
use crate::services::ForwardedRequest;

use super::AppState;

/// Relays any `/api/*` call the edge does not handle itself to the backend
///
/// The bearer comes from the `accessToken` cookie even when it does not decode;
/// the backend decides what it accepts. Only allow-listed headers cross the
/// edge in either direction.
pub async fn forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> AppResult<Response<Body>> {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path());
    let session = SessionContext::from_cookies(&jar);

    let forwarded = state
        .backend
        .forward(ForwardedRequest {
            method,
            path: path.to_string(),
            query: uri.query().map(str::to_string),
            headers: allowed_headers(&headers, FORWARDED_REQUEST_HEADERS),
            bearer: session.token,
            body,
        })
        .await?;

    let mut response = Response::new(Body::from(forwarded.body));
    *response.status_mut() = forwarded.status;
    *response.headers_mut() = forwarded.headers;
    Ok(response)
}
