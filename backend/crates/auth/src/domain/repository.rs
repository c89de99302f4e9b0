//! Repository Traits
//!
//! Persistence contracts consumed by the use cases. Implementations live in
//! the infrastructure layer.

use uuid::Uuid;

use crate::domain::entity::{
    account::NewAccount,
    session::Session,
    user::{User, UserCredential},
};
use crate::domain::value_object::{email::Email, role::Role, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new principal with the variant's fixed role.
    ///
    /// Unique violations on email/username surface as `DuplicateEmail` /
    /// `DuplicateUsername`, never a generic persistence failure.
    async fn insert(&self, account: &NewAccount) -> AuthResult<UserId>;

    /// Find the credential record for login verification
    async fn find_credential_by_email(&self, email: &Email)
    -> AuthResult<Option<UserCredential>>;

    /// Materialize the principal projection for a stored id.
    ///
    /// Pure read; the shared second phase of account creation, and the
    /// profile/refresh lookup.
    async fn find_profile(&self, user_id: &UserId) -> AuthResult<Option<User>>;
}

/// Refresh session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a new session
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find a session by the literal refresh-token string.
    ///
    /// Lookup is by token value, not by parsed claims: a token that predates
    /// a rotation matches no row and is rejected even though its signature
    /// is structurally valid.
    async fn find_by_refresh_token(&self, refresh_token: &str) -> AuthResult<Option<Session>>;

    /// Atomically replace the session's token pair.
    ///
    /// The update is keyed on `prev_refresh_token`; of concurrent racers
    /// holding the same stale token, at most one matches and the rest fail
    /// with `RotationConflict`.
    async fn rotate(
        &self,
        session_id: Uuid,
        prev_refresh_token: &str,
        new_access_token: &str,
        new_refresh_token: &str,
    ) -> AuthResult<()>;

    /// Delete a session on sign-out. `SessionNotFound` if absent.
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Remove sessions past their absolute expiry; returns the count
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Read-only role reference data
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    /// Look up a role by rank
    async fn find_by_rank(&self, rank: i16) -> AuthResult<Option<Role>>;

    /// List all roles
    async fn list(&self) -> AuthResult<Vec<Role>>;
}
