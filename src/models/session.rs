use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::{Credential, ProfileMarker};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const SELECTED_PROFILE_COOKIE: &str = "selectedProfile";

/// Per-request view of the client-side session
///
/// Built once at the framework boundary from the request cookies and passed
/// explicitly to whatever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// `None` when the cookie is missing or does not decode
    pub credential: Option<Credential>,
    /// Raw token, kept so it can be forwarded as a bearer
    pub token: Option<String>,
    /// Raw `selectedProfile` cookie value
    pub profile: Option<String>,
}

impl SessionContext {
    pub fn from_cookies(jar: &CookieJar) -> Self {
        let token = non_empty(jar, ACCESS_TOKEN_COOKIE);
        let credential = token.as_deref().and_then(Credential::decode);
        Self {
            credential,
            token,
            profile: non_empty(jar, SELECTED_PROFILE_COOKIE),
        }
    }

    /// Presence only; the gate never looks inside the marker
    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }

    pub fn profile_marker(&self) -> Option<ProfileMarker> {
        self.profile.as_deref().and_then(ProfileMarker::decode)
    }
}

fn non_empty(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Builds a session cookie with the attributes every session cookie shares
pub fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie that, passed to [`CookieJar::remove`], clears `name`
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}
