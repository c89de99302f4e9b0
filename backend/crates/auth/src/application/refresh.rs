//! Refresh Use Case
//!
//! Exchanges a valid refresh token for a new Passport, rotating the session
//! atomically. The new refresh token keeps the original expiry ceiling; only
//! the access token gets a fresh lifetime.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::passport::{Passport, TokenPair};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::token::{TokenCodec, TokenKind, TokenSubject};
use crate::error::{AuthError, AuthResult};

/// Refresh use case
pub struct RefreshUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    codec: TokenCodec,
}

impl<U, S> RefreshUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            codec: TokenCodec::new(config),
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<Passport> {
        // Parse before trusting any stored state; a tampered token never
        // reaches the store.
        let claims = self.codec.parse(TokenKind::Refresh, refresh_token)?;

        // Look up by the literal token string. A token that predates a
        // rotation has a valid signature but matches no row.
        let session = self
            .session_repo
            .find_by_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        // Re-read the profile so the new access token carries the CURRENT
        // role, not the rank frozen into the old claims.
        let user = self
            .user_repo
            .find_profile(&session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let subject = TokenSubject {
            user_id: *user.user_id.as_uuid(),
            role_rank: user.role.rank(),
        };

        let new_access = self.codec.issue(TokenKind::Access, Some(subject));
        let new_refresh = self.codec.repeat(subject, claims.expires_at);

        self.session_repo
            .rotate(session.session_id, refresh_token, &new_access, &new_refresh)
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "Session rotated"
        );

        Ok(Passport {
            user,
            token: TokenPair {
                session_id: session.session_id,
                access_token: new_access,
                refresh_token: new_refresh,
            },
        })
    }
}
