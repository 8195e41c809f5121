//! Google OAuth sign-in.
//!
//! Two public routes: `/api/auth/google` kicks the browser over to Google's
//! consent screen, `/api/auth/callback/google` exchanges the returned code,
//! fetches the userinfo document and provisions the user + session. Access is
//! restricted to one email domain; anyone else gets a 403 before any user row
//! is created.
//!
//! The OAuth `state` parameter carries a CSRF nonce (mirrored in a
//! short-lived cookie and checked on return) together with the validated
//! post-login destination. A tampered destination degrades to the default;
//! a missing or mismatched nonce aborts the callback outright.

use axum::{
    extract::{Extension, Query},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Redirect},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use super::session::{cookie_value, session_cookie};
use super::state::{AuthConfig, AuthState};
use super::storage::{insert_session, upsert_user};
use super::utils::{
    email_in_domain, generate_session_token, hash_session_token, normalize_email, valid_email,
};
use crate::redirect::{is_valid_redirect_path, DEFAULT_DESTINATION};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPES: &str = "openid email profile";

/// Holds the CSRF nonce for one OAuth round-trip.
const STATE_COOKIE_NAME: &str = "qportal_oauth_state";
const STATE_COOKIE_TTL_SECONDS: i64 = 600;

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

/// `GET /api/auth/google` — start the sign-in round-trip.
pub async fn authorize(
    Query(params): Query<AuthorizeParams>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    // The Query extractor already percent-decoded the parameter once, so only
    // validation is left before it rides along in the OAuth state.
    let destination = params
        .callback_url
        .as_deref()
        .filter(|path| is_valid_redirect_path(path))
        .unwrap_or(DEFAULT_DESTINATION);

    let nonce = match generate_session_token() {
        Ok(nonce) => nonce,
        Err(err) => {
            error!("Failed to generate OAuth state nonce: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let config = auth_state.config();
    let mut response_headers = HeaderMap::new();
    match state_cookie(config, &nonce) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build OAuth state cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let url = format!(
        "{GOOGLE_AUTH_URL}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        urlencoding::encode(config.google_client_id()),
        urlencoding::encode(&config.google_redirect_uri()),
        urlencoding::encode(GOOGLE_SCOPES),
        urlencoding::encode(&encode_state(&nonce, destination)),
    );

    (response_headers, Redirect::to(&url)).into_response()
}

/// `GET /api/auth/callback/google` — finish the sign-in round-trip.
pub async fn callback(
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Some(error) = params.error {
        // User denied consent or Google rejected the request; back to login.
        info!("Google OAuth error: {error}");
        return Redirect::to("/login").into_response();
    }
    let Some(code) = params.code else {
        info!("Google OAuth callback missing code parameter");
        return Redirect::to("/login").into_response();
    };

    // The nonce half of the state must match the cookie set by `authorize`;
    // a callback this browser never started gets dropped before any Google
    // round-trip happens.
    let Some((nonce, raw_destination)) = params.state.as_deref().and_then(split_state) else {
        info!("Google OAuth callback with missing or malformed state");
        return Redirect::to("/login").into_response();
    };
    if cookie_value(&headers, STATE_COOKIE_NAME).as_deref() != Some(nonce) {
        info!("Google OAuth state nonce mismatch");
        return Redirect::to("/login").into_response();
    }

    let access_token = match exchange_code(&auth_state, &code).await {
        Ok(access_token) => access_token,
        Err(err) => {
            error!("Google token exchange failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let userinfo = match fetch_userinfo(&auth_state, &access_token).await {
        Ok(userinfo) => userinfo,
        Err(err) => {
            error!("Google userinfo fetch failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let email = normalize_email(userinfo.email.as_deref().unwrap_or_default());
    if !valid_email(&email) || userinfo.email_verified != Some(true) {
        info!("Rejecting sign-in with unverified or malformed email");
        return forbidden_page(auth_state.config().allowed_email_domain());
    }
    // Domain restriction happens before any user row exists.
    if !email_in_domain(&email, auth_state.config().allowed_email_domain()) {
        info!("Rejecting sign-in from outside the allowed domain");
        return forbidden_page(auth_state.config().allowed_email_domain());
    }

    let user_id = match upsert_user(
        &pool,
        &email,
        userinfo.name.as_deref(),
        userinfo.picture.as_deref(),
    )
    .await
    {
        Ok(user_id) => user_id,
        Err(err) => {
            error!("Failed to upsert user: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let token = match generate_session_token() {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to generate session token: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let token_hash = hash_session_token(&token);
    let ttl_seconds = auth_state.config().session_ttl_seconds();
    if let Err(err) = insert_session(&pool, user_id, &token_hash, ttl_seconds).await {
        error!("Failed to insert session: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let mut response_headers = HeaderMap::new();
    match session_cookie(auth_state.config(), &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    // The nonce is single-use; drop the state cookie with the same response.
    if let Ok(cookie) = clear_state_cookie(auth_state.config()) {
        response_headers.append(SET_COOKIE, cookie);
    }

    // Re-validate the destination on the way back in; the resolver does the
    // same dance once more, but a clean value here keeps the chain readable.
    let destination = Some(raw_destination)
        .filter(|path| is_valid_redirect_path(path))
        .unwrap_or(DEFAULT_DESTINATION);

    let location = format!("/post-auth?callbackUrl={}", urlencoding::encode(destination));
    (response_headers, Redirect::to(&location)).into_response()
}

/// Pack the CSRF nonce and the validated destination into the OAuth `state`.
/// The nonce is base64url, so the first `:` is always the separator.
fn encode_state(nonce: &str, destination: &str) -> String {
    format!("{nonce}:{destination}")
}

fn split_state(state: &str) -> Option<(&str, &str)> {
    state.split_once(':')
}

fn state_cookie(config: &AuthConfig, nonce: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure_attribute = if config.session_cookie_secure() {
        "; Secure"
    } else {
        ""
    };
    HeaderValue::from_str(&format!(
        "{STATE_COOKIE_NAME}={nonce}; Path=/; HttpOnly; SameSite=Lax; \
         Max-Age={STATE_COOKIE_TTL_SECONDS}{secure_attribute}"
    ))
}

fn clear_state_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure_attribute = if config.session_cookie_secure() {
        "; Secure"
    } else {
        ""
    };
    HeaderValue::from_str(&format!(
        "{STATE_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{secure_attribute}"
    ))
}

async fn exchange_code(auth_state: &AuthState, code: &str) -> anyhow::Result<String> {
    let config = auth_state.config();
    let form = [
        ("code", code),
        ("client_id", config.google_client_id()),
        ("client_secret", config.google_client_secret().expose_secret()),
        ("redirect_uri", &config.google_redirect_uri()),
        ("grant_type", "authorization_code"),
    ];

    let response: TokenResponse = auth_state
        .http()
        .post(GOOGLE_TOKEN_URL)
        .form(&form)
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = response.error {
        let description = response.error_description.unwrap_or_default();
        anyhow::bail!("token endpoint returned {error}: {description}");
    }
    response
        .access_token
        .ok_or_else(|| anyhow::anyhow!("token endpoint returned no access_token"))
}

async fn fetch_userinfo(auth_state: &AuthState, access_token: &str) -> anyhow::Result<UserInfo> {
    let userinfo = auth_state
        .http()
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await?
        .json()
        .await?;
    Ok(userinfo)
}

fn forbidden_page(allowed_domain: &str) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Html(format!(
            r"<!DOCTYPE html>
<html>
<head><title>Access restricted</title></head>
<body>
<h1>Access restricted</h1>
<p>Access is restricted to @{allowed_domain} email addresses only.</p>
<p><a href='/login'>Back to login</a></p>
</body>
</html>"
        )),
    )
        .into_response()
}
