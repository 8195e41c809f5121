//! Auth configuration and per-process auth state.

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::SecretString;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: String,
    allowed_email_domain: String,
    session_ttl_seconds: i64,
    google_client_id: String,
    google_client_secret: SecretString,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String, allowed_email_domain: String) -> Self {
        Self {
            base_url,
            allowed_email_domain,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            google_client_id: String::new(),
            google_client_secret: SecretString::default(),
        }
    }

    #[must_use]
    pub fn with_google_client(mut self, client_id: String, client_secret: SecretString) -> Self {
        self.google_client_id = client_id;
        self.google_client_secret = client_secret;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn allowed_email_domain(&self) -> &str {
        &self.allowed_email_domain
    }

    #[must_use]
    pub fn google_client_id(&self) -> &str {
        &self.google_client_id
    }

    pub(super) fn google_client_secret(&self) -> &SecretString {
        &self.google_client_secret
    }

    /// OAuth redirect URI registered with Google for this deployment.
    #[must_use]
    pub fn google_redirect_uri(&self) -> String {
        format!(
            "{}/api/auth/callback/google",
            self.base_url.trim_end_matches('/')
        )
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Secure cookies (and the `__Secure-` name) only make sense behind TLS.
    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Shared auth state: configuration plus the outbound HTTP client used for
/// the Google token and userinfo calls. Built once at startup and passed by
/// `Extension`, never looked up globally.
pub struct AuthState {
    config: AuthConfig,
    http: Client,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the outbound HTTP client cannot be constructed.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build auth HTTP client")?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn http(&self) -> &Client {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> AuthConfig {
        AuthConfig::new(base_url.to_string(), "q-summit.com".to_string())
    }

    #[test]
    fn redirect_uri_trims_trailing_slash() {
        assert_eq!(
            config("https://portal.q-summit.com/").google_redirect_uri(),
            "https://portal.q-summit.com/api/auth/callback/google"
        );
    }

    #[test]
    fn cookie_secure_follows_scheme() {
        assert!(config("https://portal.q-summit.com").session_cookie_secure());
        assert!(!config("http://localhost:8080").session_cookie_secure());
    }

    #[test]
    fn session_ttl_default_and_override() {
        assert_eq!(
            config("http://localhost:8080").session_ttl_seconds(),
            DEFAULT_SESSION_TTL_SECONDS
        );
        assert_eq!(
            config("http://localhost:8080")
                .with_session_ttl_seconds(60)
                .session_ttl_seconds(),
            60
        );
    }
}
