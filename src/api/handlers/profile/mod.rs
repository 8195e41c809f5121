//! Profile API: read the caller's member profile and complete onboarding.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;
use utoipa::ToSchema;

use super::auth::session::authenticate_session;
use crate::domain::profile::{ProfileUpdate, ValidationIssue};

pub(crate) mod storage;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub status: String,
    pub last_active_year: Option<i32>,
    pub division: String,
    pub team: String,
    pub team_other: Option<String>,
    pub is_profile_complete: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub error: &'static str,
    pub issues: Vec<ValidationIssue>,
}

#[utoipa::path(
    get,
    path = "/api/profile/me",
    responses(
        (status = 200, description = "The caller's member profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid session cookie"),
        (status = 404, description = "No profile yet (onboarding not completed)")
    ),
    tag = "profile"
)]
pub async fn get_my(headers: HeaderMap, pool: Extension<PgPool>) -> impl IntoResponse {
    let record = match authenticate_session(&headers, &pool).await {
        Ok(Some(record)) => record,
        Ok(None) => return StatusCode::UNAUTHORIZED.into_response(),
        Err(status) => return status.into_response(),
    };

    match storage::fetch_profile(&pool, record.user_id).await {
        Ok(Some(row)) => {
            let response = ProfileResponse {
                status: row.status,
                last_active_year: row.last_active_year,
                division: row.division,
                team: row.team,
                team_other: row.team_other,
                is_profile_complete: row.is_profile_complete,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to fetch profile: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/profile/complete",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile stored and marked complete", body = CompleteResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Missing or invalid session cookie")
    ),
    tag = "profile"
)]
pub async fn complete(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Json(payload): Json<ProfileUpdate>,
) -> impl IntoResponse {
    let record = match authenticate_session(&headers, &pool).await {
        Ok(Some(record)) => record,
        Ok(None) => return StatusCode::UNAUTHORIZED.into_response(),
        Err(status) => return status.into_response(),
    };

    let normalized = match payload.validate() {
        Ok(normalized) => normalized,
        Err(issues) => {
            let response = ValidationErrorResponse {
                error: "Validation failed",
                issues,
            };
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    match storage::upsert_profile(&pool, record.user_id, &normalized).await {
        Ok(()) => (StatusCode::OK, Json(CompleteResponse { ok: true })).into_response(),
        Err(err) => {
            error!("Failed to upsert profile: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
