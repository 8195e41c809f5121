//! # Q-Portal (internal member portal)
//!
//! `qportal` is the Q-Summit internal member portal service. It handles
//! Google-based login restricted to a single email domain, the post-login
//! profile-completion gate, and the JSON API behind the portal pages.
//!
//! ## Gating model
//!
//! Every request passes a two-tier check:
//!
//! - **Edge gate** (cheap, allocation-light): only looks at session-cookie
//!   *presence* and decides allow / redirect-to-login / 401 before any
//!   handler runs. It never verifies the token.
//! - **Authoritative verification**: handlers that need an identity resolve
//!   the cookie against the sessions table (hashed token, expiry checked).
//!
//! ## Redirect safety
//!
//! `callbackUrl` parameters survive the login detour so deep links keep
//! working, but only after percent-decoding and open-redirect validation.
//! Anything suspicious silently falls back to `/dashboard`.

pub mod api;
pub mod cli;
pub mod domain;
pub mod redirect;
pub mod slack;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
