//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::application::{
    GetProfileUseCase, LoginInput, LoginUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
    SignOutUseCase,
};
use crate::domain::entity::account::AccountKind;
use crate::domain::repository::{RoleRepository, SessionRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CleanupResponse, LoginRequest, PassportResponse, RefreshRequest, RegisterRequest, RoleResponse,
    SignOutRequest, UserResponse,
};

/// Header gating administrator self-registration (privileged bootstrap,
/// separate from the Authorization Gate)
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        email: req.email,
        user_name: req.username,
        password: req.password,
    };

    let user = use_case.execute(input, AccountKind::Customer).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /admin/register
///
/// Same creation flow with the Admin variant, gated by the configured admin
/// secret key.
pub async fn admin_register<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    if state.config.admin_secret.is_empty() || provided != state.config.admin_secret {
        return Err(AuthError::Unauthorized);
    }

    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        email: req.email,
        user_name: req.username,
        password: req.password,
    };

    let user = use_case.execute(input, AccountKind::Admin).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Login / Refresh / Sign Out
// ============================================================================

/// POST /login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<PassportResponse>>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let passport = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(PassportResponse::from(&passport)))
}

/// POST /refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<PassportResponse>>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case =
        RefreshUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let passport = use_case.execute(&req.refresh_token).await?;

    Ok(Json(PassportResponse::from(&passport)))
}

/// POST /signout
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignOutRequest>,
) -> AuthResult<StatusCode>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.repo.clone());
    use_case.execute(req.session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Profile / Roles
// ============================================================================

/// GET /users/{user_id}
pub async fn get_profile<R>(
    State(state): State<AuthAppState<R>>,
    Path(user_id): Path<Uuid>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = GetProfileUseCase::new(state.repo.clone());
    let user = use_case.execute(UserId::from_uuid(user_id)).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// GET /roles
pub async fn list_roles<R>(
    State(state): State<AuthAppState<R>>,
) -> AuthResult<Json<Vec<RoleResponse>>>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let roles = state.repo.list().await?;

    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

// ============================================================================
// Admin maintenance
// ============================================================================

/// POST /admin/sessions/cleanup
pub async fn cleanup_sessions<R>(
    State(state): State<AuthAppState<R>>,
) -> AuthResult<Json<CleanupResponse>>
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let deleted = SessionRepository::cleanup_expired(state.repo.as_ref()).await?;

    Ok(Json(CleanupResponse {
        sessions_deleted: deleted,
    }))
}
