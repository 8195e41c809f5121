//! Minimal HTML pages for the portal shell.
//!
//! The edge gate guards these by cookie presence; `/post-auth` and
//! `/complete-profile` (in the auth module) do the authoritative checks.

use axum::{
    extract::Query,
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

/// `GET /` — the portal root is just an entry into the app.
pub async fn root() -> impl IntoResponse {
    Redirect::to(crate::redirect::DEFAULT_DESTINATION)
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// `GET /login` — sign-in page. Forwards the `callbackUrl` (still encoded)
/// into the OAuth kick-off route so the deep link survives the round-trip.
pub async fn login(Query(params): Query<LoginParams>) -> impl IntoResponse {
    let auth_href = match params.callback_url.as_deref() {
        Some(callback_url) => format!(
            "/api/auth/google?callbackUrl={}",
            urlencoding::encode(callback_url)
        ),
        None => "/api/auth/google".to_string(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Q-Portal - Sign in</title></head>
<body>
<h1>Q-Portal</h1>
<p>Internal member portal. Sign in with your Q-Summit Google account.</p>
<p><a href="{auth_href}">Sign in with Google</a></p>
</body>
</html>"#
    ))
}

/// `GET /dashboard` — application landing page.
pub async fn dashboard() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Q-Portal - Dashboard</title></head>
<body>
<h1>Dashboard</h1>
<p>Welcome back.</p>
<p><a href="/api/auth/session">Session</a> | <a href="/complete-profile">Profile</a></p>
</body>
</html>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/dashboard"
        );
    }

    #[tokio::test]
    async fn login_forwards_callback_into_oauth_route() {
        let response = login(Query(LoginParams {
            callback_url: Some("/reports?year=2025".to_string()),
        }))
        .await
        .into_response();

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let html = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(html.contains("/api/auth/google?callbackUrl=%2Freports%3Fyear%3D2025"));
    }

    #[tokio::test]
    async fn login_without_callback_links_plain_oauth_route() {
        let response = login(Query(LoginParams { callback_url: None }))
            .await
            .into_response();

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let html = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(html.contains("href=\"/api/auth/google\""));
    }
}
