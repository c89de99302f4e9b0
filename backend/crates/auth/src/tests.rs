//! Use-case flow tests against an in-memory repository
//!
//! Exercises the full register → login → refresh → sign-out lifecycle,
//! rotation races, and the authorization gate predicates without a database.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::application::{
    GetProfileUseCase, LoginInput, LoginUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
    SignOutUseCase,
};
use crate::domain::entity::account::{AccountKind, NewAccount};
use crate::domain::entity::session::Session;
use crate::domain::entity::user::{User, UserCredential};
use crate::domain::repository::{RoleRepository, SessionRepository, UserRepository};
use crate::domain::token::{TokenCodec, TokenKind, TokenSubject};
use crate::domain::value_object::{
    email::Email, role::Role, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// In-memory repository
// ============================================================================

struct StoredUser {
    user_id: UserId,
    email: String,
    username: String,
    password_hash: String,
    role_rank: i16,
}

#[derive(Default)]
struct MemInner {
    users: Vec<StoredUser>,
    sessions: Vec<Session>,
}

/// In-memory implementation of the repository traits.
///
/// Mirrors the Postgres semantics that matter to the use cases: unique
/// email/username, lookup by literal refresh-token string, and rotation
/// conditional on the pre-rotation token value.
#[derive(Clone, Default)]
struct MemStore {
    inner: Arc<Mutex<MemInner>>,
}

impl MemStore {
    fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    fn set_role(&self, user_id: &UserId, rank: i16) {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.user_id == *user_id)
            .expect("user exists");
        user.role_rank = rank;
    }
}

impl UserRepository for MemStore {
    async fn insert(&self, account: &NewAccount) -> AuthResult<UserId> {
        let mut inner = self.inner.lock().unwrap();

        if inner.users.iter().any(|u| u.email == account.email.as_str()) {
            return Err(AuthError::DuplicateEmail);
        }
        if inner
            .users
            .iter()
            .any(|u| u.username == account.user_name.as_str())
        {
            return Err(AuthError::DuplicateUsername);
        }

        let user_id = UserId::new();
        inner.users.push(StoredUser {
            user_id,
            email: account.email.as_str().to_string(),
            username: account.user_name.as_str().to_string(),
            password_hash: account.password_hash.as_phc_string().to_string(),
            role_rank: account.role_rank(),
        });

        Ok(user_id)
    }

    async fn find_credential_by_email(
        &self,
        email: &Email,
    ) -> AuthResult<Option<UserCredential>> {
        let inner = self.inner.lock().unwrap();

        inner
            .users
            .iter()
            .find(|u| u.email == email.as_str())
            .map(|u| {
                Ok(UserCredential {
                    user_id: u.user_id,
                    password_hash: UserPassword::from_phc_string(u.password_hash.clone())
                        .map_err(|e| AuthError::Internal(e.to_string()))?,
                    role: Role::from_rank(u.role_rank).ok_or(AuthError::Internal(
                        format!("Unknown role rank: {}", u.role_rank),
                    ))?,
                })
            })
            .transpose()
    }

    async fn find_profile(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let inner = self.inner.lock().unwrap();

        inner
            .users
            .iter()
            .find(|u| u.user_id == *user_id)
            .map(|u| {
                Ok(User {
                    user_id: u.user_id,
                    email: Email::from_db(u.email.clone()),
                    user_name: UserName::from_db(u.username.clone()),
                    role: Role::from_rank(u.role_rank).ok_or(AuthError::Internal(
                        format!("Unknown role rank: {}", u.role_rank),
                    ))?,
                })
            })
            .transpose()
    }
}

impl SessionRepository for MemStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        self.inner.lock().unwrap().sessions.push(session.clone());
        Ok(())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> AuthResult<Option<Session>> {
        let now_ms = Utc::now().timestamp_millis();
        let inner = self.inner.lock().unwrap();

        Ok(inner
            .sessions
            .iter()
            .find(|s| s.refresh_token == refresh_token && s.expires_at_ms > now_ms)
            .cloned())
    }

    async fn rotate(
        &self,
        session_id: Uuid,
        prev_refresh_token: &str,
        new_access_token: &str,
        new_refresh_token: &str,
    ) -> AuthResult<()> {
        let mut inner = self.inner.lock().unwrap();

        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.session_id == session_id && s.refresh_token == prev_refresh_token);

        match session {
            Some(s) => {
                s.access_token = new_access_token.to_string();
                s.refresh_token = new_refresh_token.to_string();
                s.updated_at = Utc::now();
                Ok(())
            }
            None => Err(AuthError::RotationConflict),
        }
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.session_id != session_id);

        if inner.sessions.len() == before {
            return Err(AuthError::SessionNotFound);
        }
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut inner = self.inner.lock().unwrap();
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.expires_at_ms >= now_ms);

        Ok((before - inner.sessions.len()) as u64)
    }
}

impl RoleRepository for MemStore {
    async fn find_by_rank(&self, rank: i16) -> AuthResult<Option<Role>> {
        Ok(Role::from_rank(rank))
    }

    async fn list(&self) -> AuthResult<Vec<Role>> {
        Ok(vec![Role::Customer, Role::Admin])
    }
}

// ============================================================================
// Helpers
// ============================================================================

const PASSWORD: &str = "CorrectHorse9!";

fn setup() -> (Arc<MemStore>, Arc<AuthConfig>) {
    (
        Arc::new(MemStore::default()),
        Arc::new(AuthConfig::with_random_secrets()),
    )
}

async fn register(
    store: &Arc<MemStore>,
    config: &Arc<AuthConfig>,
    email: &str,
    username: &str,
    kind: AccountKind,
) -> AuthResult<User> {
    RegisterUseCase::new(store.clone(), config.clone())
        .execute(
            RegisterInput {
                email: email.to_string(),
                user_name: username.to_string(),
                password: PASSWORD.to_string(),
            },
            kind,
        )
        .await
}

async fn login(
    store: &Arc<MemStore>,
    config: &Arc<AuthConfig>,
    email: &str,
) -> AuthResult<crate::domain::entity::passport::Passport> {
    LoginUseCase::new(store.clone(), store.clone(), config.clone())
        .execute(LoginInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
}

// ============================================================================
// Registration
// ============================================================================

mod registration {
    use super::*;

    #[tokio::test]
    async fn customer_registration_returns_projection() {
        let (store, config) = setup();

        let user = register(&store, &config, "A@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();

        assert_eq!(user.email.as_str(), "a@x.com");
        assert_eq!(user.user_name.as_str(), "alice");
        assert_eq!(user.role, Role::Customer);
        assert_eq!(store.user_count(), 1);
        // No auto-login: registration must not create a session
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn admin_variant_gets_admin_rank() {
        let (store, config) = setup();

        let user = register(&store, &config, "ops@x.com", "opsteam", AccountKind::Admin)
            .await
            .unwrap();

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.role.rank(), 2);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let (store, config) = setup();

        register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();

        let err = register(&store, &config, "a@x.com", "bob", AccountKind::Customer)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let (store, config) = setup();

        register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();

        let err = register(&store, &config, "b@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateUsername));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn invalid_input_rejected_before_persistence() {
        let (store, config) = setup();

        let err = register(&store, &config, "not-an-email", "alice", AccountKind::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(store.user_count(), 0);
    }
}

// ============================================================================
// Login
// ============================================================================

mod login_flow {
    use super::*;

    #[tokio::test]
    async fn login_issues_decodable_claims() {
        let (store, config) = setup();
        let user = register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();

        let passport = login(&store, &config, "a@x.com").await.unwrap();

        let codec = TokenCodec::new(config.clone());
        let access = codec
            .parse(TokenKind::Access, &passport.token.access_token)
            .unwrap();
        let refresh = codec
            .parse(TokenKind::Refresh, &passport.token.refresh_token)
            .unwrap();

        let expected = TokenSubject {
            user_id: *user.user_id.as_uuid(),
            role_rank: Role::Customer.rank(),
        };
        assert_eq!(access.subject, Some(expected));
        assert_eq!(refresh.subject, Some(expected));
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn wrong_password_yields_invalid_credential_and_no_session() {
        let (store, config) = setup();
        register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();

        let err = LoginUseCase::new(store.clone(), store.clone(), config.clone())
            .execute(LoginInput {
                email: "a@x.com".to_string(),
                password: "WrongPassword1!".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredential));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn unknown_account_indistinguishable_from_wrong_password() {
        let (store, config) = setup();

        let err = login(&store, &config, "ghost@x.com").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredential));
    }
}

// ============================================================================
// Refresh & rotation
// ============================================================================

mod rotation {
    use super::*;

    #[tokio::test]
    async fn refresh_rotates_and_invalidates_old_token() {
        let (store, config) = setup();
        register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();
        let passport = login(&store, &config, "a@x.com").await.unwrap();

        let use_case = RefreshUseCase::new(store.clone(), store.clone(), config.clone());

        let rotated = use_case.execute(&passport.token.refresh_token).await.unwrap();
        assert_ne!(rotated.token.access_token, passport.token.access_token);
        assert_ne!(rotated.token.refresh_token, passport.token.refresh_token);
        assert_eq!(rotated.token.session_id, passport.token.session_id);

        // The pre-rotation token maps to no stored session anymore
        let err = use_case
            .execute(&passport.token.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));

        // The rotated token works exactly once more
        let again = use_case.execute(&rotated.token.refresh_token).await;
        assert!(again.is_ok());
        let err = use_case
            .execute(&rotated.token.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn refresh_preserves_expiry_ceiling() {
        let (store, config) = setup();
        register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();
        let passport = login(&store, &config, "a@x.com").await.unwrap();

        let codec = TokenCodec::new(config.clone());
        let original = codec
            .parse(TokenKind::Refresh, &passport.token.refresh_token)
            .unwrap();

        let rotated = RefreshUseCase::new(store.clone(), store.clone(), config.clone())
            .execute(&passport.token.refresh_token)
            .await
            .unwrap();

        let repeated = codec
            .parse(TokenKind::Refresh, &rotated.token.refresh_token)
            .unwrap();

        // Rotation never pushes the absolute expiry out
        assert_eq!(repeated.expires_at, original.expires_at);
    }

    #[tokio::test]
    async fn refresh_reflects_current_role() {
        let (store, config) = setup();
        let user = register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();
        let passport = login(&store, &config, "a@x.com").await.unwrap();

        // Promote after the tokens were issued
        store.set_role(&user.user_id, Role::Admin.rank());

        let rotated = RefreshUseCase::new(store.clone(), store.clone(), config.clone())
            .execute(&passport.token.refresh_token)
            .await
            .unwrap();

        let codec = TokenCodec::new(config.clone());
        let access = codec
            .parse(TokenKind::Access, &rotated.token.access_token)
            .unwrap();
        assert_eq!(access.subject.unwrap().role_rank, Role::Admin.rank());
    }

    #[tokio::test]
    async fn forged_or_garbage_token_rejected_before_store_lookup() {
        let (store, config) = setup();

        let err = RefreshUseCase::new(store.clone(), store.clone(), config.clone())
            .execute("garbage.token")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn structurally_valid_but_unknown_token_yields_session_not_found() {
        let (store, config) = setup();

        // Signed with our key but never persisted (e.g. predates a rotation
        // that has since been cleaned up)
        let codec = TokenCodec::new(config.clone());
        let orphan = codec.issue(
            TokenKind::Refresh,
            Some(TokenSubject {
                user_id: Uuid::new_v4(),
                role_rank: 1,
            }),
        );

        let err = RefreshUseCase::new(store.clone(), store.clone(), config.clone())
            .execute(&orphan)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn concurrent_refresh_has_exactly_one_winner() {
        let (store, config) = setup();
        register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();
        let passport = login(&store, &config, "a@x.com").await.unwrap();

        let first = RefreshUseCase::new(store.clone(), store.clone(), config.clone());
        let second = RefreshUseCase::new(store.clone(), store.clone(), config.clone());

        let token = passport.token.refresh_token.clone();
        let (a, b) = tokio::join!(first.execute(&token), second.execute(&token));

        let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(winners, 1, "exactly one racer may win the rotation");

        let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(
            loser,
            AuthError::SessionNotFound | AuthError::RotationConflict
        ));

        // Still a single session row; no divergent passports
        assert_eq!(store.session_count(), 1);
    }
}

// ============================================================================
// Sign out & full lifecycle
// ============================================================================

mod sign_out_flow {
    use super::*;

    #[tokio::test]
    async fn signout_unknown_session_fails() {
        let (store, _config) = setup();

        let err = SignOutUseCase::new(store.clone())
            .execute(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn register_login_refresh_signout_lifecycle() {
        let (store, config) = setup();

        // register
        let user = register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();

        // login
        let passport = login(&store, &config, "a@x.com").await.unwrap();
        assert_eq!(passport.user.user_id, user.user_id);

        // refresh: both token strings must change
        let refresh_uc = RefreshUseCase::new(store.clone(), store.clone(), config.clone());
        let rotated = refresh_uc.execute(&passport.token.refresh_token).await.unwrap();
        assert_ne!(rotated.token.access_token, passport.token.access_token);
        assert_ne!(rotated.token.refresh_token, passport.token.refresh_token);

        // sign out with the rotated session id
        SignOutUseCase::new(store.clone())
            .execute(rotated.token.session_id)
            .await
            .unwrap();

        // the newest refresh token is dead
        let err = refresh_uc
            .execute(&rotated.token.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));

        // the profile remains readable
        let profile = GetProfileUseCase::new(store.clone())
            .execute(user.user_id)
            .await
            .unwrap();
        assert_eq!(profile.user_id, user.user_id);
    }

    #[tokio::test]
    async fn cleanup_removes_only_expired_sessions() {
        let (store, config) = setup();
        register(&store, &config, "a@x.com", "alice", AccountKind::Customer)
            .await
            .unwrap();
        login(&store, &config, "a@x.com").await.unwrap();

        // Plant an already-expired session next to the live one
        let expired = Session::new(
            UserId::new(),
            "stale-access".to_string(),
            "stale-refresh".to_string(),
            chrono::Duration::milliseconds(-1),
        );
        SessionRepository::create(store.as_ref(), &expired).await.unwrap();

        let deleted = SessionRepository::cleanup_expired(store.as_ref()).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.session_count(), 1);
    }
}

// ============================================================================
// Authorization gate predicates
// ============================================================================

mod gate {
    use super::*;
    use crate::presentation::middleware::{
        API_KEY_HEADER, check_min_role, check_subject_ownership, extract_access_claims,
        verify_api_key,
    };
    use axum::http::{HeaderMap, HeaderValue, header};

    fn claims_for(rank: i16) -> (crate::domain::token::Claims, Uuid, TokenCodec) {
        let config = Arc::new(AuthConfig::with_random_secrets());
        let codec = TokenCodec::new(config);
        let user_id = Uuid::new_v4();
        let token = codec.issue(
            TokenKind::Access,
            Some(TokenSubject {
                user_id,
                role_rank: rank,
            }),
        );
        let claims = codec.parse(TokenKind::Access, &token).unwrap();
        (claims, user_id, codec)
    }

    #[test]
    fn api_key_check() {
        let config = Arc::new(AuthConfig::with_random_secrets());
        let codec = TokenCodec::new(config);

        let mut headers = HeaderMap::new();
        assert!(matches!(
            verify_api_key(&codec, &headers),
            Err(AuthError::Unauthorized)
        ));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("bogus"));
        assert!(matches!(
            verify_api_key(&codec, &headers),
            Err(AuthError::Unauthorized)
        ));

        let key = codec.issue(TokenKind::ApiKey, None);
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(&key).unwrap());
        assert!(verify_api_key(&codec, &headers).is_ok());
    }

    #[test]
    fn access_token_check() {
        let config = Arc::new(AuthConfig::with_random_secrets());
        let codec = TokenCodec::new(config);
        let token = codec.issue(
            TokenKind::Access,
            Some(TokenSubject {
                user_id: Uuid::new_v4(),
                role_rank: 1,
            }),
        );

        let mut headers = HeaderMap::new();
        assert!(matches!(
            extract_access_claims(&codec, &headers),
            Err(AuthError::Unauthorized)
        ));

        // Wrong scheme
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&token).unwrap());
        assert!(matches!(
            extract_access_claims(&codec, &headers),
            Err(AuthError::Unauthorized)
        ));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        let claims = extract_access_claims(&codec, &headers).unwrap();
        assert_eq!(claims.kind, TokenKind::Access);

        // A refresh token is not an access proof
        let refresh = codec.issue(
            TokenKind::Refresh,
            Some(TokenSubject {
                user_id: Uuid::new_v4(),
                role_rank: 1,
            }),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {refresh}")).unwrap(),
        );
        assert!(matches!(
            extract_access_claims(&codec, &headers),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn customer_rank_forbidden_on_admin_endpoint() {
        let (customer, _, _) = claims_for(Role::Customer.rank());
        assert!(matches!(
            check_min_role(&customer, Role::Admin),
            Err(AuthError::Forbidden)
        ));

        let (admin, _, _) = claims_for(Role::Admin.rank());
        assert!(check_min_role(&admin, Role::Admin).is_ok());
        assert!(check_min_role(&admin, Role::Customer).is_ok());
    }

    #[test]
    fn subject_ownership_check() {
        let (claims, user_id, _) = claims_for(Role::Customer.rank());

        assert!(check_subject_ownership(&claims, user_id).is_ok());
        assert!(matches!(
            check_subject_ownership(&claims, Uuid::new_v4()),
            Err(AuthError::Forbidden)
        ));

        // Administrators may address any subject
        let (admin, _, _) = claims_for(Role::Admin.rank());
        assert!(check_subject_ownership(&admin, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn api_key_claims_fail_role_check() {
        let config = Arc::new(AuthConfig::with_random_secrets());
        let codec = TokenCodec::new(config);
        let key = codec.issue(TokenKind::ApiKey, None);
        let claims = codec.parse(TokenKind::ApiKey, &key).unwrap();

        // No subject: possession of the api key is not a role
        assert!(matches!(
            check_min_role(&claims, Role::Customer),
            Err(AuthError::Forbidden)
        ));
    }
}
