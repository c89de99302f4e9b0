//! Passport Entity
//!
//! The composite response of principal projection + token pair returned on
//! login and refresh. Transient: constructed fresh per response, never
//! persisted.

use uuid::Uuid;

use crate::domain::entity::user::User;

/// Access/refresh token pair anchored to a session
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Session id (needed by the client for sign-out)
    pub session_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

/// Principal projection plus its token pair
#[derive(Debug, Clone)]
pub struct Passport {
    pub user: User,
    pub token: TokenPair,
}
