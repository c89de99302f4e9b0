//! Application Configuration
//!
//! Configuration for the Auth application layer. Injected by `Arc` into the
//! token codec, use cases, and middleware; nothing reads keys or lifetimes
//! from ambient globals.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key for access tokens (32 bytes)
    pub access_secret: [u8; 32],
    /// HMAC key for refresh tokens (32 bytes); independent of the access
    /// key so one leaked key cannot forge the other kind
    pub refresh_secret: [u8; 32],
    /// HMAC key for api-key tokens (32 bytes)
    pub api_key_secret: [u8; 32],
    /// Secret gating administrator self-registration
    pub admin_secret: String,
    /// Access token lifetime (short; the sign-out mitigation)
    pub access_ttl: Duration,
    /// Refresh token lifetime; also the absolute session lifetime
    pub refresh_ttl: Duration,
    /// Api-key token lifetime (long-lived)
    pub api_key_ttl: Duration,
    /// Per-query persistence timeout
    pub query_timeout: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: [0u8; 32],
            refresh_secret: [0u8; 32],
            api_key_secret: [0u8; 32],
            admin_secret: String::new(),
            access_ttl: Duration::from_secs(15 * 60),           // 15 minutes
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),    // 1 week
            api_key_ttl: Duration::from_secs(365 * 24 * 3600),  // 1 year
            query_timeout: Duration::from_secs(5),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets (for development and tests)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;

        let mut rng = rand::rng();
        let mut secret = || {
            let mut key = [0u8; 32];
            rng.fill_bytes(&mut key);
            key
        };

        Self {
            access_secret: secret(),
            refresh_secret: secret(),
            api_key_secret: secret(),
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self {
            admin_secret: "dev-admin-secret".to_string(),
            ..Self::with_random_secrets()
        }
    }

    /// Refresh TTL as chrono duration for expiry arithmetic
    pub fn refresh_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.refresh_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(7))
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
