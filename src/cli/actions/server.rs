use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            base_url,
            allowed_email_domain,
            google_client_id,
            google_client_secret,
            slack_token,
        } => {
            // Fail fast on an unusable base URL instead of producing broken
            // OAuth redirects at runtime.
            Url::parse(&base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;

            let auth_config = AuthConfig::new(base_url, allowed_email_domain)
                .with_google_client(google_client_id, google_client_secret);

            api::new(port, dsn, auth_config, slack_token).await?;
        }
    }

    Ok(())
}
