//! Token Codec
//!
//! Builds and parses compact signed claim sets. A token is two base64url
//! parts, `payload.signature`, where the payload is the JSON claims and the
//! signature is HMAC-SHA256 over the encoded payload.
//!
//! Each kind signs with its own key, so a leaked access key cannot forge
//! refresh tokens. Parsing verifies the signature before looking at the
//! payload at all; a tampered token fails closed before expiry is checked.
//!
//! The codec owns no state beyond the injected configuration handle.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Token kinds, each with an independent key and lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    /// Machine-to-machine / pre-login proof of possession; carries no
    /// principal claims
    ApiKey,
}

impl TokenKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::ApiKey => "api_key",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal claims embedded in access/refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSubject {
    /// Principal id
    pub user_id: Uuid,
    /// Role rank at issuance
    pub role_rank: i16,
}

/// Decoded token payload.
///
/// The field set (principal id, role rank, issued-at, expires-at, kind) is a
/// stable contract; the wire encoding is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal claims; `None` for api-key tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<TokenSubject>,
    pub kind: TokenKind,
    /// Unix timestamp (seconds)
    pub issued_at: i64,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
}

/// Parse failures, ordered: signature/shape problems are `Invalid`,
/// a well-signed token past its expiry is `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
    Expired,
}

/// Signs and parses tokens with per-kind keys and lifetimes from config
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<AuthConfig>,
}

impl TokenCodec {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    /// Issue a token of the given kind with a full fresh lifetime
    pub fn issue(&self, kind: TokenKind, subject: Option<TokenSubject>) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            subject,
            kind,
            issued_at: now,
            expires_at: now + self.lifetime_secs(kind),
        };
        self.sign(&claims)
    }

    /// Re-sign a refresh token carrying forward an existing expiry.
    ///
    /// Used during rotation: the new refresh token keeps the original
    /// absolute expiry, so refreshing never extends total session lifetime.
    pub fn repeat(&self, subject: TokenSubject, expires_at: i64) -> String {
        let claims = Claims {
            subject: Some(subject),
            kind: TokenKind::Refresh,
            issued_at: Utc::now().timestamp(),
            expires_at,
        };
        self.sign(&claims)
    }

    /// Verify and decode a token of the expected kind.
    ///
    /// Order matters: signature first (constant-time), then shape and kind,
    /// then expiry.
    pub fn parse(&self, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Invalid)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Invalid)?;

        let mut mac = HmacSha256::new_from_slice(self.key(kind))
            .expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature).map_err(|_| TokenError::Invalid)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        if claims.kind != kind {
            return Err(TokenError::Invalid);
        }

        if Utc::now().timestamp() >= claims.expires_at {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> String {
        let payload = serde_json::to_vec(claims).expect("claims serialization is infallible");
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload);

        let mut mac = HmacSha256::new_from_slice(self.key(claims.kind))
            .expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());
        let signature = mac.finalize().into_bytes();

        format!("{}.{}", payload_b64, URL_SAFE_NO_PAD.encode(signature))
    }

    fn key(&self, kind: TokenKind) -> &[u8; 32] {
        match kind {
            TokenKind::Access => &self.config.access_secret,
            TokenKind::Refresh => &self.config.refresh_secret,
            TokenKind::ApiKey => &self.config.api_key_secret,
        }
    }

    fn lifetime_secs(&self, kind: TokenKind) -> i64 {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl,
            TokenKind::Refresh => self.config.refresh_ttl,
            TokenKind::ApiKey => self.config.api_key_ttl,
        };
        ttl.as_secs() as i64
    }
}
