//! Configuration types for the auth layer

use std::time::Duration;

use crate::crypto::{HmacKey, HmacKeyError};

/// Auth configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for session signing (at least 32 bytes)
    pub session_secret: String,
    /// Session lifetime
    pub session_duration: Duration,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Whether the cookie carries the `Secure` attribute
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Default cookie name
    pub const DEFAULT_COOKIE_NAME: &'static str = "sparkle_session";

    /// Create a config, rejecting secrets that are too short to sign with
    pub fn try_new(session_secret: impl Into<String>) -> Result<Self, HmacKeyError> {
        let session_secret = session_secret.into();
        HmacKey::new(&session_secret)?;
        Ok(Self {
            session_secret,
            session_duration: Duration::from_secs(24 * 60 * 60),
            cookie_name: Self::DEFAULT_COOKIE_NAME.to_string(),
            cookie_secure: true,
        })
    }

    /// Set session duration
    #[must_use]
    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    /// Set whether cookies require HTTPS
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// `Set-Cookie` value carrying a session token
    pub fn session_cookie(&self, token: &str) -> String {
        let secure = if self.cookie_secure { "; Secure" } else { "" };
        format!(
            "{}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{secure}",
            self.cookie_name,
            self.session_duration.as_secs()
        )
    }

    /// `Set-Cookie` value that clears the session cookie
    pub fn clear_cookie(&self) -> String {
        let secure = if self.cookie_secure { "; Secure" } else { "" };
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{secure}",
            self.cookie_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        assert!(AuthConfig::try_new("too-short").is_err());
        assert!(AuthConfig::try_new("x".repeat(32)).is_ok());
    }

    #[test]
    fn test_cookie_attributes() {
        let config = AuthConfig::try_new("k".repeat(32))
            .unwrap()
            .with_session_duration(Duration::from_secs(3600));
        let cookie = config.session_cookie("abc.def");
        assert!(cookie.starts_with("sparkle_session=abc.def;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));

        let insecure = config.with_cookie_secure(false);
        assert!(!insecure.clear_cookie().contains("Secure"));
        assert!(insecure.clear_cookie().contains("Max-Age=0"));
    }
}
