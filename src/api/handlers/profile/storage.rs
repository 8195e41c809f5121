//! Database helpers for member profiles.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::profile::NormalizedProfile;

/// Raw profile row as stored. Enum columns come back as text; the API layer
/// re-serializes them verbatim.
#[derive(Debug)]
pub(crate) struct ProfileRow {
    pub(crate) status: String,
    pub(crate) last_active_year: Option<i32>,
    pub(crate) division: String,
    pub(crate) team: String,
    pub(crate) team_other: Option<String>,
    pub(crate) is_profile_complete: bool,
}

/// Read the profile-completion flag for a user.
///
/// A missing row means the user never completed onboarding: `false`. The flag
/// only ever moves to `true`; nothing here resets it.
pub(crate) async fn profile_completion(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let query = "SELECT is_profile_complete FROM member_profile WHERE user_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup profile completion")?;

    Ok(row.is_some_and(|row| row.get("is_profile_complete")))
}

/// Fetch the full profile row for a user.
pub(crate) async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileRow>> {
    let query = r"
        SELECT status, last_active_year, division, team, team_other, is_profile_complete
        FROM member_profile
        WHERE user_id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch profile")?;

    Ok(row.map(|row| ProfileRow {
        status: row.get("status"),
        last_active_year: row.get("last_active_year"),
        division: row.get("division"),
        team: row.get("team"),
        team_other: row.get("team_other"),
        is_profile_complete: row.get("is_profile_complete"),
    }))
}

/// Upsert the profile row, marking it complete.
///
/// Keyed on `user_id`, so duplicate submissions (double click, retry after a
/// slow response) are idempotent at the storage layer; no coordination needed.
pub(crate) async fn upsert_profile(
    pool: &PgPool,
    user_id: Uuid,
    profile: &NormalizedProfile,
) -> Result<()> {
    let query = r"
        INSERT INTO member_profile
            (user_id, status, last_active_year, division, team, team_other, is_profile_complete)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            status = EXCLUDED.status,
            last_active_year = EXCLUDED.last_active_year,
            division = EXCLUDED.division,
            team = EXCLUDED.team,
            team_other = EXCLUDED.team_other,
            is_profile_complete = EXCLUDED.is_profile_complete
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(profile.status.as_str())
        .bind(profile.last_active_year)
        .bind(profile.division.as_str())
        .bind(profile.team.as_str())
        .bind(profile.team_other.as_deref())
        .bind(profile.is_profile_complete)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to upsert profile")?;

    Ok(())
}
