//! Edge session gate.
//!
//! Runs in front of every route and decides allow / redirect / 401 from
//! cookie *presence* alone, in a single pass with no database access. This is
//! the cheap optimistic half of the two-tier design: token validity and expiry
//! are checked later by [`authenticate_session`] where an identity is actually
//! needed. A forged cookie gets past this gate and no further.
//!
//! [`authenticate_session`]: super::handlers::auth::session::authenticate_session

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use super::handlers::auth::session::extract_session_token;
use crate::redirect::is_valid_redirect_path;

/// Where authenticated users land when they hit `/login` again. Going through
/// the completion check (instead of straight to the dashboard) re-runs the
/// onboarding gate; if the profile is already complete that page forwards on.
pub const COMPLETE_PROFILE_PATH: &str = "/complete-profile";

/// Paths that never require authentication. `/login` matches exactly; the
/// auth API matches on whole path segments, so `/api/authz` is not public.
fn is_public(path: &str) -> bool {
    path == "/login" || has_segment_prefix(path, "/api/auth")
}

/// Prefix match on whole path segments: the prefix must be followed by `/`
/// or the end of the path. `/loginphish` is not under `/login`.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// What the gate decided for a request.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GateDecision {
    /// Let the request through to the router.
    Allow,
    /// API path without a session: JSON 401, no redirect.
    Unauthorized,
    /// Page path without a session: off to `/login`, optionally carrying the
    /// original path+query as `callbackUrl`.
    LoginRedirect { callback_url: Option<String> },
    /// Authenticated user on `/login`: rerun the completion check.
    CompleteProfileRedirect,
}

/// Pure, single-pass gate decision.
pub(crate) fn decide(path: &str, query: Option<&str>, has_session: bool) -> GateDecision {
    if is_excluded(path) {
        return GateDecision::Allow;
    }

    if !has_session && !is_public(path) {
        if has_segment_prefix(path, "/api") {
            return GateDecision::Unauthorized;
        }

        // Carry the original location through login so deep links survive,
        // but only when the path itself is a safe redirect target.
        let callback_url = if is_valid_redirect_path(path) {
            Some(match query {
                Some(query) => format!("{path}?{query}"),
                None => path.to_string(),
            })
        } else {
            None
        };
        return GateDecision::LoginRedirect { callback_url };
    }

    if has_session && path == "/login" {
        return GateDecision::CompleteProfileRedirect;
    }

    GateDecision::Allow
}

/// Static assets and infrastructure endpoints bypass the gate entirely.
fn is_excluded(path: &str) -> bool {
    path == "/health" || path == "/favicon.ico" || path.starts_with("/assets/")
}

/// Axum middleware wrapping [`decide`].
pub async fn session_gate(request: Request, next: Next) -> Response {
    let has_session = extract_session_token(request.headers()).is_some();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    match decide(&path, query.as_deref(), has_session) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            [(CONTENT_TYPE, "application/json")],
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response(),
        GateDecision::LoginRedirect { callback_url } => {
            let location = match callback_url {
                Some(original) => {
                    format!("/login?callbackUrl={}", urlencoding::encode(&original))
                }
                None => "/login".to_string(),
            };
            Redirect::to(&location).into_response()
        }
        GateDecision::CompleteProfileRedirect => Redirect::to(COMPLETE_PROFILE_PATH).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_without_session_redirects_with_callback() {
        assert_eq!(
            decide("/dashboard", None, false),
            GateDecision::LoginRedirect {
                callback_url: Some("/dashboard".to_string())
            }
        );
    }

    #[test]
    fn query_string_is_carried_along() {
        assert_eq!(
            decide("/reports", Some("year=2025"), false),
            GateDecision::LoginRedirect {
                callback_url: Some("/reports?year=2025".to_string())
            }
        );
    }

    #[test]
    fn unsafe_path_drops_the_callback() {
        // Protocol-relative paths would turn the login redirect into an open
        // redirect; bounce to login without a callbackUrl instead.
        assert_eq!(
            decide("//evil.com", None, false),
            GateDecision::LoginRedirect { callback_url: None }
        );
    }

    #[test]
    fn api_without_session_is_unauthorized() {
        assert_eq!(decide("/api/profile/me", None, false), GateDecision::Unauthorized);
        assert_eq!(
            decide("/api/slack/message", None, false),
            GateDecision::Unauthorized
        );
    }

    #[test]
    fn public_paths_pass_without_session() {
        assert_eq!(decide("/login", None, false), GateDecision::Allow);
        assert_eq!(decide("/api/auth/google", None, false), GateDecision::Allow);
        assert_eq!(
            decide("/api/auth/callback/google", Some("code=x"), false),
            GateDecision::Allow
        );
    }

    #[test]
    fn login_with_session_reruns_completion_check() {
        assert_eq!(
            decide("/login", None, true),
            GateDecision::CompleteProfileRedirect
        );
    }

    #[test]
    fn login_with_session_and_query_still_redirects() {
        assert_eq!(
            decide("/login", Some("callbackUrl=%2Freports"), true),
            GateDecision::CompleteProfileRedirect
        );
    }

    #[test]
    fn authenticated_requests_pass_through() {
        assert_eq!(decide("/dashboard", None, true), GateDecision::Allow);
        assert_eq!(decide("/api/profile/me", None, true), GateDecision::Allow);
    }

    #[test]
    fn lookalike_paths_are_not_public() {
        assert_eq!(
            decide("/loginphish", None, false),
            GateDecision::LoginRedirect {
                callback_url: Some("/loginphish".to_string())
            }
        );
        assert_eq!(decide("/api/authz", None, false), GateDecision::Unauthorized);
        assert_eq!(
            decide("/api/authz-admin", None, false),
            GateDecision::Unauthorized
        );
    }

    #[test]
    fn api_prefix_matches_whole_segments_only() {
        // Not under /api at all, so it is a page, not a JSON 401.
        assert_eq!(
            decide("/apifoo", None, false),
            GateDecision::LoginRedirect {
                callback_url: Some("/apifoo".to_string())
            }
        );
        assert_eq!(decide("/api", None, false), GateDecision::Unauthorized);
    }

    #[test]
    fn excluded_paths_skip_the_gate() {
        assert_eq!(decide("/health", None, false), GateDecision::Allow);
        assert_eq!(decide("/favicon.ico", None, false), GateDecision::Allow);
        assert_eq!(decide("/assets/app.css", None, false), GateDecision::Allow);
    }
}
