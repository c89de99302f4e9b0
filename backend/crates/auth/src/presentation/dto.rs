//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::passport::Passport;
use crate::domain::entity::user::User;
use crate::domain::value_object::role::Role;

// ============================================================================
// Register
// ============================================================================

/// Register request (customer and admin variants share it)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

// ============================================================================
// Login / Refresh
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Sign out request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutRequest {
    pub session_id: Uuid,
}

// ============================================================================
// Responses
// ============================================================================

/// Principal projection response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.user_id.as_uuid(),
            email: user.email.as_str().to_string(),
            username: user.user_name.as_str().to_string(),
            role: user.role.title().to_string(),
        }
    }
}

/// Token pair response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub session_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

/// Passport response: principal + token pair
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportResponse {
    pub user: UserResponse,
    pub token: TokenResponse,
}

impl From<&Passport> for PassportResponse {
    fn from(passport: &Passport) -> Self {
        Self {
            user: UserResponse::from(&passport.user),
            token: TokenResponse {
                session_id: passport.token.session_id,
                access_token: passport.token.access_token.clone(),
                refresh_token: passport.token.refresh_token.clone(),
            },
        }
    }
}

/// Role reference entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub rank: i16,
    pub title: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            rank: role.rank(),
            title: role.title().to_string(),
        }
    }
}

/// Session cleanup response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub sessions_deleted: u64,
}
