use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::{
    middleware::request_id::RequestId,
    models::{session::removal_cookie, RouteRequest, SessionContext, ACCESS_TOKEN_COOKIE},
    services::gate::{self, GateDecision, Rule},
};

/// Path prefixes that never reach the gate
const EXCLUDED_PREFIXES: &[&str] = &[
    "/api",
    "/health",
    "/_next/static",
    "/_next/image",
    "/static",
    "/assets",
    "/images",
];

const EXCLUDED_FILES: &[&str] = &["/favicon.ico"];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "avif"];

/// API routes, static assets and images bypass the gate
pub fn is_excluded(path: &str) -> bool {
    let under_prefix = EXCLUDED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    });
    if under_prefix || EXCLUDED_FILES.contains(&path) {
        return true;
    }

    let last_segment = path.rsplit('/').next().unwrap_or_default();
    last_segment
        .rsplit_once('.')
        .is_some_and(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|image| ext.eq_ignore_ascii_case(image))
        })
}

/// Runs the route access gate in front of every page navigation
///
/// Cookies are read into a [`SessionContext`] here, once, and the decision is
/// left to [`gate::evaluate`]. Redirects are `307 Temporary Redirect`.
pub async fn access_gate_middleware(request: Request, next: Next) -> Response {
    if is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());
    let session = SessionContext::from_cookies(&jar);
    let route = RouteRequest::from_uri(request.uri());

    match gate::evaluate(&session, &route, Utc::now().timestamp()) {
        GateDecision::Continue => next.run(request).await,
        GateDecision::Redirect { to, rule } => {
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::debug!(
                request_id = %request_id,
                path = %route.path,
                rule = %rule,
                to = to.path(),
                "Access gate redirect"
            );

            let redirect = Redirect::temporary(to.path());
            if rule == Rule::Expired {
                // Without this the follow-up /login request would carry the
                // same expired token and be redirected again.
                let jar = jar.remove(removal_cookie(ACCESS_TOKEN_COOKIE));
                return (jar, redirect).into_response();
            }
            redirect.into_response()
        }
    }
}
