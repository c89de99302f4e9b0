//! PostgreSQL Repository Implementations
//!
//! All queries are parameterized and run under a per-query timeout so a
//! stalled backend surfaces as `Timeout` instead of hanging the request.
//! Duplicate-key classification uses the violated constraint name reported
//! by the driver, never the human-readable message text.

use chrono::Utc;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entity::{
    account::NewAccount,
    session::Session,
    user::{User, UserCredential},
};
use crate::domain::repository::{RoleRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, role::Role, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// Unique constraint names on the `users` table
const EMAIL_CONSTRAINT: &str = "users_email_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = self
            .timed(
                sqlx::query("DELETE FROM oauth WHERE expires_at_ms < $1")
                    .bind(now_ms)
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }

    /// Bound a query by the configured timeout
    async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(AuthError::Timeout),
        }
    }
}

/// Map a unique violation on insert to its user-actionable error kind
fn classify_insert_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some(EMAIL_CONSTRAINT) => return AuthError::DuplicateEmail,
            Some(USERNAME_CONSTRAINT) => return AuthError::DuplicateUsername,
            _ => {}
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn insert(&self, account: &NewAccount) -> AuthResult<UserId> {
        let user_id = UserId::new();
        let now = Utc::now();

        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO users (
                    id,
                    email,
                    username,
                    password_hash,
                    role_id,
                    created_at,
                    updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(account.email.as_str())
            .bind(account.user_name.as_str())
            .bind(account.password_hash.as_phc_string())
            .bind(account.role_rank())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|_| AuthError::Timeout)?;

        let id = result.map_err(classify_insert_error)?;

        Ok(UserId::from_uuid(id))
    }

    async fn find_credential_by_email(
        &self,
        email: &Email,
    ) -> AuthResult<Option<UserCredential>> {
        let row = self
            .timed(
                sqlx::query_as::<_, CredentialRow>(
                    r#"
                    SELECT
                        id,
                        password_hash,
                        role_id
                    FROM users
                    WHERE email = $1
                    "#,
                )
                .bind(email.as_str())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(|r| r.into_credential()).transpose()
    }

    async fn find_profile(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = self
            .timed(
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT
                        id,
                        email,
                        username,
                        role_id
                    FROM users
                    WHERE id = $1
                    "#,
                )
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        self.timed(
            sqlx::query(
                r#"
                INSERT INTO oauth (
                    id,
                    user_id,
                    access_token,
                    refresh_token,
                    expires_at_ms,
                    created_at,
                    updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(session.session_id)
            .bind(session.user_id.as_uuid())
            .bind(&session.access_token)
            .bind(&session.refresh_token)
            .bind(session.expires_at_ms)
            .bind(session.created_at)
            .bind(session.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> AuthResult<Option<Session>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = self
            .timed(
                sqlx::query_as::<_, OauthRow>(
                    r#"
                    SELECT
                        id,
                        user_id,
                        access_token,
                        refresh_token,
                        expires_at_ms,
                        created_at,
                        updated_at
                    FROM oauth
                    WHERE refresh_token = $1 AND expires_at_ms > $2
                    "#,
                )
                .bind(refresh_token)
                .bind(now_ms)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn rotate(
        &self,
        session_id: Uuid,
        prev_refresh_token: &str,
        new_access_token: &str,
        new_refresh_token: &str,
    ) -> AuthResult<()> {
        // Conditional update keyed on the pre-rotation token value: of
        // concurrent racers holding the same stale token, at most one row
        // matches and the rest observe zero rows affected.
        let updated = self
            .timed(
                sqlx::query(
                    r#"
                    UPDATE oauth SET
                        access_token = $3,
                        refresh_token = $4,
                        updated_at = $5
                    WHERE id = $1 AND refresh_token = $2
                    "#,
                )
                .bind(session_id)
                .bind(prev_refresh_token)
                .bind(new_access_token)
                .bind(new_refresh_token)
                .bind(Utc::now())
                .execute(&self.pool),
            )
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AuthError::RotationConflict);
        }

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        let deleted = self
            .timed(
                sqlx::query("DELETE FROM oauth WHERE id = $1")
                    .bind(session_id)
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AuthError::SessionNotFound);
        }

        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        PgAuthRepository::cleanup_expired(self).await
    }
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for PgAuthRepository {
    async fn find_by_rank(&self, rank: i16) -> AuthResult<Option<Role>> {
        let row = self
            .timed(
                sqlx::query_scalar::<_, i16>("SELECT id FROM roles WHERE id = $1")
                    .bind(rank)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(|id| {
            Role::from_rank(id).ok_or_else(|| AuthError::Internal(format!("Unknown role rank: {id}")))
        })
        .transpose()
    }

    async fn list(&self) -> AuthResult<Vec<Role>> {
        let rows = self
            .timed(
                sqlx::query_scalar::<_, i16>("SELECT id FROM roles ORDER BY id")
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter()
            .map(|id| {
                Role::from_rank(id)
                    .ok_or_else(|| AuthError::Internal(format!("Unknown role rank: {id}")))
            })
            .collect()
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    password_hash: String,
    role_id: i16,
}

impl CredentialRow {
    fn into_credential(self) -> AuthResult<UserCredential> {
        let role = Role::from_rank(self.role_id)
            .ok_or_else(|| AuthError::Internal(format!("Unknown role rank: {}", self.role_id)))?;

        Ok(UserCredential {
            user_id: UserId::from_uuid(self.id),
            password_hash: UserPassword::from_phc_string(self.password_hash)
                .map_err(|e| AuthError::Internal(e.to_string()))?,
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    role_id: i16,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = Role::from_rank(self.role_id)
            .ok_or_else(|| AuthError::Internal(format!("Unknown role rank: {}", self.role_id)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            user_name: UserName::from_db(self.username),
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OauthRow {
    id: Uuid,
    user_id: Uuid,
    access_token: String,
    refresh_token: String,
    expires_at_ms: i64,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl OauthRow {
    fn into_session(self) -> Session {
        Session {
            session_id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
