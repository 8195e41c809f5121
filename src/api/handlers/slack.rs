//! Slack notification endpoint.
//!
//! The edge gate already requires a session cookie for `/api/slack/*`; this
//! handler is a thin passthrough to the Slack client.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::slack::{SlackClient, SlackError};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub channel: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendMessageResponse {
    pub success: bool,
    pub channel: String,
    pub message: String,
    pub ts: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlackErrorResponse {
    pub error: String,
}

#[utoipa::path(
    post,
    path = "/api/slack/message",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message posted", body = SendMessageResponse),
        (status = 400, description = "Invalid input or Slack-side rejection", body = SlackErrorResponse),
        (status = 502, description = "Slack unreachable")
    ),
    tag = "slack"
)]
pub async fn send_message(
    slack: Extension<Arc<SlackClient>>,
    Json(payload): Json<SendMessageRequest>,
) -> impl IntoResponse {
    if payload.channel.trim().is_empty() {
        return bad_request("Channel is required");
    }
    if payload.message.trim().is_empty() {
        return bad_request("Message is required");
    }

    match slack.post_message(&payload.channel, &payload.message).await {
        Ok(ts) => {
            let response = SendMessageResponse {
                success: true,
                channel: payload.channel,
                message: payload.message,
                ts,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err @ SlackError::Api(_)) => bad_request(&err.to_string()),
        Err(err) => {
            error!("Slack request failed: {err}");
            (
                StatusCode::BAD_GATEWAY,
                Json(SlackErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(SlackErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
