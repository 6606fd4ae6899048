/// Route access gate
///
/// Decides, for every page navigation, whether the visitor may see the page or
/// must be sent somewhere else first. The decision is a pure function of the
/// session, the requested route and the current time.
use std::fmt::Display;

use crate::models::{PathCategory, RouteRequest, SessionContext};

/// Fixed redirect targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    Subscription,
    Profiles,
    Home,
}

impl Destination {
    pub fn path(self) -> &'static str {
        match self {
            Destination::Login => "/login",
            Destination::Subscription => "/subscription",
            Destination::Profiles => "/profiles",
            Destination::Home => "/home",
        }
    }
}

/// Which rule produced a redirect, for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Unauthenticated,
    Expired,
    ResultWithoutCheckout,
    ResultAlreadyActive,
    Unsubscribed,
    ProfileRequired,
    ProfileAlreadyChosen,
    AuthScreenWhileSignedIn,
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rule::Unauthenticated => "unauthenticated",
            Rule::Expired => "expired",
            Rule::ResultWithoutCheckout => "result_without_checkout",
            Rule::ResultAlreadyActive => "result_already_active",
            Rule::Unsubscribed => "unsubscribed",
            Rule::ProfileRequired => "profile_required",
            Rule::ProfileAlreadyChosen => "profile_already_chosen",
            Rule::AuthScreenWhileSignedIn => "auth_screen_while_signed_in",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect { to: Destination, rule: Rule },
}

impl GateDecision {
    fn redirect(to: Destination, rule: Rule) -> Self {
        GateDecision::Redirect { to, rule }
    }

    pub fn destination(&self) -> Option<Destination> {
        match self {
            GateDecision::Continue => None,
            GateDecision::Redirect { to, .. } => Some(*to),
        }
    }
}

/// Evaluates the gate. Rules are checked in order and the first match wins.
pub fn evaluate(session: &SessionContext, route: &RouteRequest, now: i64) -> GateDecision {
    let category = route.category();

    let Some(credential) = &session.credential else {
        if category.is_auth_screen() {
            return GateDecision::Continue;
        }
        return GateDecision::redirect(Destination::Login, Rule::Unauthenticated);
    };

    if credential.is_expired(now) {
        return GateDecision::redirect(Destination::Login, Rule::Expired);
    }

    // Checkout return pages come before the subscription/profile rules, so an
    // active user holding a session id lands on /profiles.
    if category == PathCategory::SubscriptionResult {
        return match (&route.session_id, credential.active) {
            (None, _) => {
                GateDecision::redirect(Destination::Subscription, Rule::ResultWithoutCheckout)
            }
            (Some(_), true) => {
                GateDecision::redirect(Destination::Profiles, Rule::ResultAlreadyActive)
            }
            (Some(_), false) => GateDecision::Continue,
        };
    }

    if !credential.active && category != PathCategory::Subscription {
        return GateDecision::redirect(Destination::Subscription, Rule::Unsubscribed);
    }

    if credential.active && !session.has_profile() && category != PathCategory::Profiles {
        return GateDecision::redirect(Destination::Profiles, Rule::ProfileRequired);
    }

    if session.has_profile() {
        if category == PathCategory::Profiles {
            return GateDecision::redirect(Destination::Home, Rule::ProfileAlreadyChosen);
        }
        if category.is_auth_screen() {
            return GateDecision::redirect(Destination::Home, Rule::AuthScreenWhileSignedIn);
        }
    }

    GateDecision::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;

    const NOW: i64 = 1_750_000_000;

    fn session(active: Option<bool>, profile: bool) -> SessionContext {
        SessionContext {
            credential: active.map(|active| Credential {
                exp: NOW + 3600,
                active,
                id: "acc_1".to_string(),
            }),
            token: active.map(|_| "t".to_string()),
            profile: profile.then(|| "marker".to_string()),
        }
    }

    fn expired(active: bool, profile: bool) -> SessionContext {
        let mut s = session(Some(active), profile);
        if let Some(c) = s.credential.as_mut() {
            c.exp = NOW - 1;
        }
        s
    }

    fn route(path: &str) -> RouteRequest {
        RouteRequest::new(path, None)
    }

    fn result_route(path: &str, session_id: &str) -> RouteRequest {
        RouteRequest::new(path, Some(session_id))
    }

    fn dest(session: &SessionContext, route: &RouteRequest) -> Option<Destination> {
        evaluate(session, route, NOW).destination()
    }

    const ALL_PATHS: &[&str] = &[
        "/",
        "/home",
        "/login",
        "/register",
        "/subscription",
        "/subscription/success",
        "/subscription/cancel",
        "/profiles",
        "/movies/12",
        "/my-list",
        "/watch/42",
    ];

    #[test]
    fn test_anonymous_visitors_only_see_auth_screens() {
        let anon = session(None, false);
        for path in ALL_PATHS {
            let expected = match *path {
                "/login" | "/register" => None,
                _ => Some(Destination::Login),
            };
            assert_eq!(dest(&anon, &route(path)), expected, "path {path}");
        }
    }

    #[test]
    fn test_profile_marker_without_credential_is_ignored() {
        let anon = session(None, true);
        assert_eq!(dest(&anon, &route("/home")), Some(Destination::Login));
        assert_eq!(dest(&anon, &route("/login")), None);
    }

    #[test]
    fn test_expired_credential_always_goes_to_login() {
        for (active, profile) in [(false, false), (true, false), (true, true)] {
            let s = expired(active, profile);
            for path in ALL_PATHS {
                assert_eq!(dest(&s, &route(path)), Some(Destination::Login), "path {path}");
                assert_eq!(
                    dest(&s, &result_route(path, "cs_1")),
                    Some(Destination::Login),
                    "path {path}"
                );
            }
        }
    }

    #[test]
    fn test_unsubscribed_users_are_confined_to_subscription() {
        for profile in [false, true] {
            let s = session(Some(false), profile);
            for path in ALL_PATHS {
                let expected = match *path {
                    "/subscription" => None,
                    _ => Some(Destination::Subscription),
                };
                assert_eq!(dest(&s, &route(path)), expected, "path {path}");
            }
        }
    }

    #[test]
    fn test_active_users_without_profile_must_pick_one() {
        let s = session(Some(true), false);
        for path in ALL_PATHS {
            let expected = match *path {
                "/profiles" => None,
                "/subscription/success" | "/subscription/cancel" => Some(Destination::Subscription),
                _ => Some(Destination::Profiles),
            };
            assert_eq!(dest(&s, &route(path)), expected, "path {path}");
        }
    }

    #[test]
    fn test_fully_resolved_session() {
        let s = session(Some(true), true);
        assert_eq!(dest(&s, &route("/profiles")), Some(Destination::Home));
        assert_eq!(dest(&s, &route("/login")), Some(Destination::Home));
        assert_eq!(dest(&s, &route("/register")), Some(Destination::Home));
        assert_eq!(dest(&s, &route("/home")), None);
        assert_eq!(dest(&s, &route("/subscription")), None);
        assert_eq!(dest(&s, &route("/movies/12")), None);
    }

    #[test]
    fn test_subscription_result_requires_session_id() {
        for s in [session(Some(false), false), session(Some(true), true)] {
            for path in ["/subscription/success", "/subscription/cancel"] {
                assert_eq!(dest(&s, &route(path)), Some(Destination::Subscription));
            }
        }
    }

    #[test]
    fn test_subscription_result_for_pending_account_is_shown() {
        let s = session(Some(false), false);
        assert_eq!(dest(&s, &result_route("/subscription/success", "cs_1")), None);
        assert_eq!(dest(&s, &result_route("/subscription/cancel", "cs_1")), None);
    }

    #[test]
    fn test_subscription_result_for_active_account_goes_to_profiles() {
        let s = session(Some(true), true);
        assert_eq!(
            dest(&s, &result_route("/subscription/cancel", "cs_1")),
            Some(Destination::Profiles)
        );
    }

    #[test]
    fn test_scenario_a_anonymous_home() {
        assert_eq!(
            dest(&session(None, false), &route("/home")),
            Some(Destination::Login)
        );
    }

    #[test]
    fn test_scenario_b_inactive_profiles() {
        assert_eq!(
            dest(&session(Some(false), false), &route("/profiles")),
            Some(Destination::Subscription)
        );
    }

    #[test]
    fn test_scenario_c_result_page_precedes_profile_rule() {
        let decision = evaluate(
            &session(Some(true), false),
            &result_route("/subscription/success", "abc"),
            NOW,
        );
        assert_eq!(
            decision,
            GateDecision::Redirect {
                to: Destination::Profiles,
                rule: Rule::ResultAlreadyActive,
            }
        );
    }

    #[test]
    fn test_scenario_d_signed_in_login() {
        let decision = evaluate(&session(Some(true), true), &route("/login"), NOW);
        assert_eq!(
            decision,
            GateDecision::Redirect {
                to: Destination::Home,
                rule: Rule::AuthScreenWhileSignedIn,
            }
        );
    }

    #[test]
    fn test_scenario_e_watch_page() {
        assert_eq!(
            evaluate(&session(Some(true), true), &route("/watch/42"), NOW),
            GateDecision::Continue
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let sessions = [
            session(None, false),
            session(Some(false), false),
            session(Some(true), false),
            session(Some(true), true),
            expired(true, true),
        ];
        for s in &sessions {
            for path in ALL_PATHS {
                for r in [route(path), result_route(path, "cs_9")] {
                    assert_eq!(evaluate(s, &r, NOW), evaluate(s, &r, NOW));
                }
            }
        }
    }

    #[test]
    fn test_destination_paths() {
        assert_eq!(Destination::Login.path(), "/login");
        assert_eq!(Destination::Subscription.path(), "/subscription");
        assert_eq!(Destination::Profiles.path(), "/profiles");
        assert_eq!(Destination::Home.path(), "/home");
        assert_eq!(Rule::Expired.to_string(), "expired");
    }
}
