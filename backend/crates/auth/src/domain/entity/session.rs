//! Session Entity
//!
//! Server-side record binding a principal to a currently-valid refresh
//! token (the `oauth` table). At most one active refresh-token string maps
//! to a session id at a time; rotation replaces the token pair in place,
//! never appends. Deleted on sign-out, not on access-token expiry.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Refresh session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID v4), the unit of sign-out
    pub session_id: Uuid,
    /// Owning principal
    pub user_id: UserId,
    /// Access token issued together with the refresh token
    pub access_token: String,
    /// Currently-valid refresh token string
    pub refresh_token: String,
    /// Absolute session expiry (Unix timestamp ms); never extended on
    /// rotation, so total session lifetime is capped
    pub expires_at_ms: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last rotation (or creation) timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session.
    ///
    /// TTL is provided by the application layer (config), not hard-coded
    /// here, and matches the refresh token lifetime.
    pub fn new(user_id: UserId, access_token: String, refresh_token: String, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            user_id,
            access_token,
            refresh_token,
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }
}
