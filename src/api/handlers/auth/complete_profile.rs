//! Profile-completion page guard.
//!
//! Users reach this page via the post-auth detour or a stale bookmark. Once
//! the profile is complete the form is never rendered again; the page always
//! forwards to the resolved destination instead. Before completion, repeated
//! visits re-render the same form with the same resolved destination for the
//! same `callbackUrl` input.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    http::HeaderMap,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::error;

use super::session::authenticate_session;
use crate::api::handlers::profile::storage::profile_completion;
use crate::domain::profile::Division;
use crate::redirect::resolve_destination;

#[derive(Debug, Deserialize)]
pub struct CompleteProfileParams {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Outcome of the completion gate for a given flag + `callbackUrl` pair.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GateOutcome {
    /// Already complete: forward immediately, never linger on the form.
    Forward(String),
    /// Incomplete: render the form, carrying the resolved destination so the
    /// submission knows where to go afterwards.
    RenderForm(String),
}

pub(crate) fn gate_outcome(profile_complete: bool, callback_url: Option<&str>) -> GateOutcome {
    let destination = resolve_destination(callback_url);
    if profile_complete {
        GateOutcome::Forward(destination)
    } else {
        GateOutcome::RenderForm(destination)
    }
}

/// `GET /complete-profile`
pub async fn complete_profile(
    headers: HeaderMap,
    Query(params): Query<CompleteProfileParams>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let record = match authenticate_session(&headers, &pool).await {
        Ok(Some(record)) => record,
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(status) => return status.into_response(),
    };

    let is_complete = match profile_completion(&pool, record.user_id).await {
        Ok(is_complete) => is_complete,
        Err(err) => {
            error!("Failed to lookup profile completion: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match gate_outcome(is_complete, params.callback_url.as_deref()) {
        GateOutcome::Forward(destination) => Redirect::to(&destination).into_response(),
        GateOutcome::RenderForm(destination) => Html(render_form(&destination)).into_response(),
    }
}

/// Minimal HTML shell for the onboarding form. Submits to the profile API and
/// then follows the carried destination.
fn render_form(destination: &str) -> String {
    let division_options = [
        Division::Chair,
        Division::Finance,
        Division::Operations,
        Division::Partner,
        Division::Pr,
    ]
    .iter()
    .map(|division| {
        format!(
            r#"<option value="{value}">{value}</option>"#,
            value = division.as_str()
        )
    })
    .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Complete your profile</title></head>
<body>
<h1>Complete your profile</h1>
<form id="profile-form">
  <label>Status
    <select name="status">
      <option value="active">Active Member</option>
      <option value="alumni">Alumni</option>
    </select>
  </label>
  <label>Last active year <input name="last_active_year" type="number" min="2016" max="2100"></label>
  <label>Board area <select name="division">{division_options}</select></label>
  <label>Team <input name="team" value="other"></label>
  <label>Team name (if Other) <input name="team_other"></label>
  <button type="submit">Save</button>
</form>
<script>
  const destination = {destination_json};
  document.getElementById("profile-form").addEventListener("submit", async (event) => {{
    event.preventDefault();
    const data = Object.fromEntries(new FormData(event.target));
    const body = {{
      status: data.status,
      last_active_year: data.last_active_year ? Number(data.last_active_year) : null,
      division: data.division,
      team: data.team,
      team_other: data.team_other || null,
    }};
    const response = await fetch("/api/profile/complete", {{
      method: "POST",
      headers: {{ "Content-Type": "application/json" }},
      body: JSON.stringify(body),
    }});
    if (response.ok) {{
      window.location.assign(destination);
    }}
  }});
</script>
</body>
</html>"#,
        division_options = division_options,
        destination_json = script_literal(destination),
    )
}

/// JSON-encode a value for embedding inside a `<script>` element.
///
/// `serde_json` leaves `<` alone, so a destination containing a literal
/// `</script>` would terminate the script element mid-string and turn the
/// carried `callbackUrl` into markup. Angle brackets and ampersands are
/// emitted as unicode escapes, which JavaScript string literals accept.
fn script_literal(destination: &str) -> String {
    serde_json::to_string(destination)
        .unwrap_or_else(|_| "\"/dashboard\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
