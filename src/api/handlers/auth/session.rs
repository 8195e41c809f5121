//! Session cookie handling and session endpoints.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{
    state::{AuthConfig, AuthState},
    storage::{delete_session, lookup_session, SessionRecord},
    utils::hash_session_token,
};

/// Session cookie name on plain-HTTP deployments (local development).
pub const SESSION_COOKIE_NAME: &str = "qportal_session";

/// Session cookie name behind TLS. Browsers enforce the `__Secure-` prefix
/// semantics, so the two names cannot collide across schemes. When both are
/// somehow present, the secure-prefixed cookie wins; this priority is relied
/// on by the edge gate and the verifier alike.
pub const SECURE_SESSION_COOKIE_NAME: &str = "__Secure-qportal_session";

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, pool: Extension<PgPool>) -> impl IntoResponse {
    match authenticate_session(&headers, &pool).await {
        Ok(Some(record)) => {
            let response = SessionResponse {
                user_id: record.user_id.to_string(),
                email: record.email,
                name: record.name,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        // Missing cookies are treated as "no session" to avoid leaking auth state.
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(status) => status.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        let token_hash = hash_session_token(&token);
        if let Err(err) = delete_session(&pool, &token_hash).await {
            error!("Failed to delete session: {err}");
        }
    }

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Authoritative session check: resolve the cookie against the database.
///
/// This is the second tier behind the presence-only edge gate. Returns
/// `Ok(None)` when the cookie is missing, unknown, or expired.
pub(crate) async fn authenticate_session(
    headers: &HeaderMap,
    pool: &PgPool,
) -> Result<Option<SessionRecord>, StatusCode> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(None);
    };
    let token_hash = hash_session_token(&token);
    match lookup_session(pool, &token_hash).await {
        Ok(record) => Ok(record),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Build the `HttpOnly` session cookie for a raw token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let (name, secure_attribute) = cookie_parts(config);
    HeaderValue::from_str(&format!(
        "{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}{secure_attribute}"
    ))
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let (name, secure_attribute) = cookie_parts(config);
    HeaderValue::from_str(&format!(
        "{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{secure_attribute}"
    ))
}

fn cookie_parts(config: &AuthConfig) -> (&'static str, &'static str) {
    if config.session_cookie_secure() {
        (SECURE_SESSION_COOKIE_NAME, "; Secure")
    } else {
        (SESSION_COOKIE_NAME, "")
    }
}

/// Read the session token from request cookies.
/// The secure-prefixed name takes priority over the plain one.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SECURE_SESSION_COOKIE_NAME)
        .or_else(|| cookie_value(headers, SESSION_COOKIE_NAME))
}

pub(super) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if key == Some(name) {
                return val.map(str::to_string);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(value));
        headers
    }

    fn config(base_url: &str) -> AuthConfig {
        AuthConfig::new(base_url.to_string(), "q-summit.com".to_string())
            .with_google_client("id".to_string(), SecretString::from("secret".to_string()))
    }

    #[test]
    fn extract_reads_plain_cookie() {
        let headers = headers_with_cookie("qportal_session=abc123");
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn extract_reads_secure_cookie() {
        let headers = headers_with_cookie("__Secure-qportal_session=xyz789");
        assert_eq!(extract_session_token(&headers).as_deref(), Some("xyz789"));
    }

    #[test]
    fn secure_cookie_takes_priority_when_both_present() {
        let headers =
            headers_with_cookie("qportal_session=plain; __Secure-qportal_session=secure");
        assert_eq!(extract_session_token(&headers).as_deref(), Some("secure"));
    }

    #[test]
    fn extract_handles_surrounding_cookies() {
        let headers = headers_with_cookie("theme=dark; qportal_session=abc123; lang=en");
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn extract_returns_none_without_session_cookie() {
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(extract_session_token(&headers), None);
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_uses_secure_name_behind_tls() {
        let cookie = session_cookie(&config("https://portal.q-summit.com"), "tok").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("__Secure-qportal_session=tok;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.ends_with("; Secure"));
    }

    #[test]
    fn session_cookie_uses_plain_name_on_http() {
        let cookie = session_cookie(&config("http://localhost:8080"), "tok").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("qportal_session=tok;"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&config("http://localhost:8080")).expect("cookie");
        assert!(cookie.to_str().expect("ascii").contains("Max-Age=0"));
    }
}
