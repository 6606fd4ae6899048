use std::path::Path;

use axum::{
    extract::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware::access_gate::is_excluded;
use crate::middleware::{access_gate_middleware, make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::proxy;
use super::AppState;

/// Creates the edge router
///
/// Every request gets a request id and a trace span; page navigations then pass
/// through the access gate before reaching the storefront UI.
pub fn create_router(state: AppState) -> Router {
    let static_dir = Path::new(&state.config.static_dir);
    let assets = ServeDir::new(static_dir);
    let pages = assets
        .clone()
        .fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(handlers::health_check))
        // Session
        .route("/api/session", get(handlers::session_status))
        .route("/api/session/login", post(handlers::login))
        .route("/api/session/logout", post(handlers::logout))
        .route(
            "/api/session/profile",
            post(handlers::select_profile).delete(handlers::clear_profile),
        )
        .route("/api/subscription/verify", post(handlers::verify_subscription))
        // Everything else under /api belongs to the backend
        .route("/api/*rest", any(proxy::forward))
        // Storefront pages and assets
        .fallback(move |request: Request| storefront(assets.clone(), pages.clone(), request))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(middleware::from_fn(access_gate_middleware)),
        )
        .with_state(state)
}

/// Serves the UI bundle
///
/// Only gated paths fall back to the `index.html` shell. A missing asset, image
/// or anything else the gate skips is a plain 404.
async fn storefront(
    assets: ServeDir,
    pages: ServeDir<ServeFile>,
    request: Request,
) -> Response {
    if is_excluded(request.uri().path()) {
        return assets.oneshot(request).await.into_response();
    }
    pages.oneshot(request).await.into_response()
}
