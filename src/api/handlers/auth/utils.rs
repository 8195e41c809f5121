//! Small helpers for session tokens and email checks.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    EMAIL_REGEX.is_match(email_normalized)
}

/// Whether a normalized email belongs to the allowed sign-in domain.
/// Sign-ins from anywhere else are rejected before a user row exists.
pub(super) fn email_in_domain(email_normalized: &str, domain: &str) -> bool {
    email_normalized
        .rsplit_once('@')
        .is_some_and(|(local, email_domain)| !local.is_empty() && email_domain == domain)
}

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; the database stores a hash.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never touch the database.
/// The hash is used for lookups when the cookie is presented.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Q-Summit.COM "), "alice@q-summit.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@q-summit.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn email_in_domain_requires_exact_domain() {
        assert!(email_in_domain("alice@q-summit.com", "q-summit.com"));
        assert!(!email_in_domain("alice@example.com", "q-summit.com"));
        // Suffix tricks must not pass.
        assert!(!email_in_domain("alice@evil-q-summit.com", "q-summit.com"));
        assert!(!email_in_domain("alice@q-summit.com.evil.com", "q-summit.com"));
        assert!(!email_in_domain("@q-summit.com", "q-summit.com"));
    }

    #[test]
    fn generate_session_token_round_trip() {
        let decoded_len = generate_session_token()
            .ok()
            .and_then(|token| URL_SAFE_NO_PAD.decode(token.as_bytes()).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn hash_session_token_stable() {
        let first = hash_session_token("token");
        let second = hash_session_token("token");
        let different = hash_session_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }
}
