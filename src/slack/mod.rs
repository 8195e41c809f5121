//! Slack Web API client for portal notifications.
//!
//! Thin `chat.postMessage` wrapper. The bot token needs the `chat:write`
//! scope and the bot must be a member of any channel it posts to; the most
//! common Slack-side errors are translated into actionable messages for the
//! caller instead of raw error codes.

use reqwest::{header::AUTHORIZATION, Client};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Errors surfaced by Slack operations.
#[derive(Debug, Error)]
pub enum SlackError {
    /// The API answered with `ok: false`.
    #[error("Slack API error: {0}")]
    Api(String),

    /// HTTP transport failure talking to Slack.
    #[error("Slack network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered 200 but the payload was not what we expect.
    #[error("Invalid Slack response: {0}")]
    InvalidResponse(String),
}

/// Slack Web API client.
///
/// Constructed once at startup and passed into request handlers; there is no
/// ambient global client.
pub struct SlackClient {
    client: Client,
    token: SecretString,
}

impl SlackClient {
    /// Build a client with the portal user agent.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(token: SecretString) -> Result<Self, SlackError> {
        let client = Client::builder().user_agent(crate::APP_USER_AGENT).build()?;
        Ok(Self { client, token })
    }

    /// Send a message to a channel (ID like `C123ABC456` or name like
    /// `#general`) and return the message timestamp.
    ///
    /// # Errors
    /// Returns [`SlackError::Api`] for Slack-side rejections, enriched with a
    /// hint for the usual bot-installation mistakes.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<String, SlackError> {
        debug!("Posting Slack message to channel {channel}");

        let payload = json!({
            "channel": channel,
            "text": text,
        });

        let response: serde_json::Value = self
            .client
            .post(format!("{SLACK_API_BASE}/chat.postMessage"))
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if response.get("ok").and_then(serde_json::Value::as_bool) != Some(true) {
            let code = response
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown_error");
            error!("Slack API error for channel {channel}: {code}");
            return Err(SlackError::Api(describe_api_error(code)));
        }

        response
            .get("ts")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SlackError::InvalidResponse("missing ts in response".to_string()))
    }
}

/// Attach a human-readable hint to the Slack error codes operators hit most.
fn describe_api_error(code: &str) -> String {
    let help = match code {
        "channel_not_found" => {
            "Make sure the bot is installed in the workspace and invited to the channel"
        }
        "not_in_channel" => "Bot must be a member of the channel; invite it with /invite",
        "account_inactive" => "The bot account is inactive; check the Slack app settings",
        "invalid_auth" | "not_authed" => "Bot token is missing or invalid",
        _ => "Check Slack app permissions and bot installation",
    };
    format!("{code} ({help})")
}
