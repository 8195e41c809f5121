//! Post-OAuth landing step.
//!
//! Runs exactly once per completed Google sign-in and decides the next hop:
//! straight to the resolved destination when the profile is complete, or a
//! detour through `/complete-profile` (keeping the deep link alive) when it
//! is not.

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::error;

use super::session::authenticate_session;
use crate::api::gate::COMPLETE_PROFILE_PATH;
use crate::api::handlers::profile::storage::profile_completion;
use crate::redirect::resolve_destination;

#[derive(Debug, Deserialize)]
pub struct PostAuthParams {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// `GET /post-auth` — terminal redirect state machine with two states.
pub async fn post_auth(
    headers: HeaderMap,
    Query(params): Query<PostAuthParams>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let record = match authenticate_session(&headers, &pool).await {
        Ok(Some(record)) => record,
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(status) => return status.into_response(),
    };

    // A failed lookup is fatal for this request; there is no safe default
    // for "is this profile complete".
    let is_complete = match profile_completion(&pool, record.user_id).await {
        Ok(is_complete) => is_complete,
        Err(err) => {
            error!("Failed to lookup profile completion: {err}");
            return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    Redirect::to(&next_hop(is_complete, params.callback_url.as_deref())).into_response()
}

/// Resolve the destination and pick the next hop.
/// Incomplete profiles detour through the completion page, re-attaching the
/// resolved destination as its own `callbackUrl`.
pub(crate) fn next_hop(profile_complete: bool, callback_url: Option<&str>) -> String {
    let destination = resolve_destination(callback_url);
    if profile_complete {
        destination
    } else {
        format!(
            "{COMPLETE_PROFILE_PATH}?callbackUrl={}",
            urlencoding::encode(&destination)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_profile_detours_with_deep_link() {
        assert_eq!(
            next_hop(false, Some("%2Freports")),
            "/complete-profile?callbackUrl=%2Freports"
        );
    }

    #[test]
    fn complete_profile_goes_straight_to_default() {
        assert_eq!(next_hop(true, None), "/dashboard");
    }

    #[test]
    fn complete_profile_follows_valid_callback() {
        assert_eq!(next_hop(true, Some("%2Freports%3Fyear%3D2025")), "/reports?year=2025");
    }

    #[test]
    fn invalid_callback_falls_back_to_default() {
        assert_eq!(next_hop(true, Some("https%3A%2F%2Fevil.com")), "/dashboard");
        assert_eq!(
            next_hop(false, Some("%2F%2Fevil.com")),
            "/complete-profile?callbackUrl=%2Fdashboard"
        );
    }

    #[test]
    fn malformed_encoding_falls_back_to_default() {
        assert_eq!(next_hop(true, Some("%2")), "/dashboard");
    }
}
