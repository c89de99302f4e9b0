//! Login Use Case
//!
//! Verifies a credential and issues a Passport: the principal projection
//! plus a fresh access/refresh token pair anchored to a new session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::passport::{Passport, TokenPair};
use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::token::{TokenCodec, TokenKind, TokenSubject};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    codec: TokenCodec,
    config: Arc<AuthConfig>,
}

impl<U, S> LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            codec: TokenCodec::new(config.clone()),
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<Passport> {
        // Unknown account, malformed email, and wrong password all collapse
        // into InvalidCredential: the boundary must not leak which accounts
        // exist.
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredential)?;

        let credential = self
            .user_repo
            .find_credential_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        let raw_password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredential)?;

        if !credential.password_hash.verify(&raw_password, self.config.pepper()) {
            return Err(AuthError::InvalidCredential);
        }

        let subject = TokenSubject {
            user_id: *credential.user_id.as_uuid(),
            role_rank: credential.role.rank(),
        };

        let access_token = self.codec.issue(TokenKind::Access, Some(subject));
        let refresh_token = self.codec.issue(TokenKind::Refresh, Some(subject));

        let session = Session::new(
            credential.user_id,
            access_token.clone(),
            refresh_token.clone(),
            self.config.refresh_ttl_chrono(),
        );
        self.session_repo.create(&session).await?;

        let user = self
            .user_repo
            .find_profile(&credential.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "User logged in"
        );

        Ok(Passport {
            user,
            token: TokenPair {
                session_id: session.session_id,
                access_token,
                refresh_token,
            },
        })
    }
}
