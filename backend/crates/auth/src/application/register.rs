//! Register Use Case
//!
//! Creates a customer or administrator principal. Returns only the principal
//! projection; registration deliberately does not auto-login, so no tokens
//! and no session are produced here.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::{AccountKind, NewAccount};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub user_name: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Create an account of the explicitly selected kind.
    ///
    /// Two-phase: insert returns the new id, then the shared materialization
    /// read produces the projection.
    pub async fn execute(&self, input: RegisterInput, kind: AccountKind) -> AuthResult<User> {
        let email =
            Email::new(input.email).map_err(|e| AuthError::Validation(e.message().to_string()))?;
        let user_name =
            UserName::new(&input.user_name).map_err(|e| AuthError::Validation(e.to_string()))?;

        let raw_password = RawPassword::new(input.password)
            .map_err(|e| AuthError::Validation(e.message().to_string()))?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let account = NewAccount::new(email, user_name, password_hash, kind);

        let user_id = self.user_repo.insert(&account).await?;

        let user = self
            .user_repo
            .find_profile(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            role = %user.role,
            "User registered"
        );

        Ok(user)
    }
}
