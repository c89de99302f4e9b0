//! Sign Out Use Case
//!
//! Deletes the refresh session. Outstanding access tokens stay valid until
//! natural expiry; the short access lifetime is the mitigation.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    pub async fn execute(&self, session_id: Uuid) -> AuthResult<()> {
        self.session_repo.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "User signed out");
        Ok(())
    }
}
