use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::session::{removal_cookie, session_cookie};
use crate::models::{
    Credential, ProfileMarker, SessionContext, ACCESS_TOKEN_COOKIE, SELECTED_PROFILE_COOKIE,
};
use crate::services::LoginRequest;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySubscriptionRequest {
    pub session_id: String,
}

/// What the UI may know about the current session
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub active: bool,
    pub profile: Option<ProfileMarker>,
}

impl SessionStatus {
    fn of(session: &SessionContext, now: i64) -> Self {
        let credential = session.credential.as_ref().filter(|c| !c.is_expired(now));
        Self {
            authenticated: credential.is_some(),
            active: credential.is_some_and(|c| c.active),
            profile: credential.and_then(|_| session.profile_marker()),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Describes the session held in the request cookies
pub async fn session_status(jar: CookieJar) -> Json<SessionStatus> {
    let session = SessionContext::from_cookies(&jar);
    Json(SessionStatus::of(&session, Utc::now().timestamp()))
}

/// Signs in against the backend and stores the issued credential
///
/// Any previously selected profile belongs to whoever was signed in before, so
/// it is dropped.
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<SessionStatus>)> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    let token = state.backend.login(&request).await?;
    let credential = Credential::decode(&token).ok_or(AppError::InvalidCredential)?;

    tracing::info!(
        request_id = %request_id,
        account = %credential.id,
        active = credential.active,
        "Signed in"
    );

    let jar = jar
        .add(session_cookie(ACCESS_TOKEN_COOKIE, token, state.config.cookie_secure))
        .remove(removal_cookie(SELECTED_PROFILE_COOKIE));

    Ok((
        jar,
        Json(SessionStatus {
            authenticated: true,
            active: credential.active,
            profile: None,
        }),
    ))
}

/// Clears the credential and the profile marker
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(SELECTED_PROFILE_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}

/// Records the profile the viewer picked
pub async fn select_profile(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(profile): Json<ProfileMarker>,
) -> AppResult<(CookieJar, StatusCode)> {
    let session = SessionContext::from_cookies(&jar);
    let credential = session
        .credential
        .filter(|c| !c.is_expired(Utc::now().timestamp()))
        .ok_or(AppError::Unauthorized)?;
    if !credential.active {
        return Err(AppError::Forbidden);
    }
    if profile.id.trim().is_empty() {
        return Err(AppError::InvalidInput("Profile id is required".to_string()));
    }

    tracing::debug!(account = %credential.id, profile = %profile.id, "Profile selected");

    let jar = jar.add(session_cookie(
        SELECTED_PROFILE_COOKIE,
        profile.encode(),
        state.config.cookie_secure,
    ));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Forgets the selected profile so the viewer picks again
pub async fn clear_profile(jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.remove(removal_cookie(SELECTED_PROFILE_COOKIE)),
        StatusCode::NO_CONTENT,
    )
}

/// Confirms a checkout with the backend and swaps in the refreshed credential
pub async fn verify_subscription(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    jar: CookieJar,
    Json(request): Json<VerifySubscriptionRequest>,
) -> AppResult<(CookieJar, Json<SessionStatus>)> {
    let session = SessionContext::from_cookies(&jar);
    let bearer = session.token.ok_or(AppError::Unauthorized)?;
    if request.session_id.trim().is_empty() {
        return Err(AppError::InvalidInput("sessionId is required".to_string()));
    }

    let token = state
        .backend
        .verify_subscription(&bearer, &request.session_id)
        .await?;
    let credential = Credential::decode(&token).ok_or(AppError::InvalidCredential)?;

    tracing::info!(
        request_id = %request_id,
        account = %credential.id,
        active = credential.active,
        "Subscription verified"
    );

    let jar = jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        token,
        state.config.cookie_secure,
    ));
    Ok((
        jar,
        Json(SessionStatus {
            authenticated: true,
            active: credential.active,
            profile: None,
        }),
    ))
}
