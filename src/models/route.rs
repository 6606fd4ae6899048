use axum::extract::Query;
use axum::http::Uri;
use serde::Deserialize;

/// Route categories the access gate distinguishes between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCategory {
    Login,
    Register,
    Subscription,
    /// `/subscription/success` and `/subscription/cancel`, the checkout return targets
    SubscriptionResult,
    Profiles,
    Other,
}

impl PathCategory {
    pub fn of(path: &str) -> Self {
        match path {
            "/login" => PathCategory::Login,
            "/register" => PathCategory::Register,
            "/subscription" => PathCategory::Subscription,
            "/subscription/success" | "/subscription/cancel" => PathCategory::SubscriptionResult,
            "/profiles" => PathCategory::Profiles,
            _ => PathCategory::Other,
        }
    }

    /// Screens an unauthenticated visitor may see
    pub fn is_auth_screen(self) -> bool {
        matches!(self, PathCategory::Login | PathCategory::Register)
    }
}

#[derive(Debug, Deserialize)]
struct ResultQuery {
    session_id: Option<String>,
}

/// The navigation target of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    /// Normalized path: no trailing slash except for the root
    pub path: String,
    /// Checkout session id from `?session_id=`; empty values count as absent
    pub session_id: Option<String>,
}

impl RouteRequest {
    pub fn new(path: &str, session_id: Option<&str>) -> Self {
        Self {
            path: normalize_path(path),
            session_id: session_id.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn from_uri(uri: &Uri) -> Self {
        let session_id = Query::<ResultQuery>::try_from_uri(uri)
            .ok()
            .and_then(|Query(q)| q.session_id);
        Self::new(uri.path(), session_id.as_deref())
    }

    pub fn category(&self) -> PathCategory {
        PathCategory::of(&self.path)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
