//! Get Profile Use Case

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Get profile use case
pub struct GetProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> GetProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, user_id: UserId) -> AuthResult<User> {
        self.user_repo
            .find_profile(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
