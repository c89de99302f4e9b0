//! Authorization Gate
//!
//! Request-time checks applied per protected route, short-circuiting on the
//! first failure:
//!
//! 1. API-key presence (`X-Api-Key` parses as a valid api-key token)
//! 2. Access-token validity (`Authorization: Bearer`, claims stored in
//!    request extensions)
//! 3. Minimum role rank, supplied by the route
//! 4. Subject ownership (path id matches the claims subject, admin override)
//!
//! Each check is a pure predicate over request metadata and configuration,
//! wrapped as an axum middleware so routes attach them in any combination.
//! Responses only ever distinguish 401 from 403; which check failed and why
//! goes to tracing.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::token::{Claims, TokenCodec, TokenKind};
use crate::domain::value_object::role::Role;
use crate::error::AuthError;

/// Header carrying the machine/pre-login api-key token
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared state for the gate middlewares
#[derive(Clone)]
pub struct GateState {
    pub codec: TokenCodec,
}

impl GateState {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self {
            codec: TokenCodec::new(config),
        }
    }
}

// ============================================================================
// Pure predicates
// ============================================================================

/// Check 1: api-key presence and validity
pub fn verify_api_key(codec: &TokenCodec, headers: &HeaderMap) -> Result<(), AuthError> {
    let value = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    codec.parse(TokenKind::ApiKey, value).map_err(|e| {
        tracing::debug!(error = ?e, "Api key rejected");
        AuthError::Unauthorized
    })?;

    Ok(())
}

/// Check 2: access-token validity; returns the parsed claims
pub fn extract_access_claims(
    codec: &TokenCodec,
    headers: &HeaderMap,
) -> Result<Claims, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let token = value.strip_prefix("Bearer ").ok_or(AuthError::Unauthorized)?;

    codec.parse(TokenKind::Access, token).map_err(|e| {
        tracing::debug!(error = ?e, "Access token rejected");
        AuthError::Unauthorized
    })
}

/// Check 3: claims carry at least the required role rank
pub fn check_min_role(claims: &Claims, required: Role) -> Result<(), AuthError> {
    let role = claims
        .subject
        .and_then(|s| Role::from_rank(s.role_rank))
        .ok_or(AuthError::Forbidden)?;

    if !role.meets(required) {
        tracing::debug!(held = %role, required = %required, "Role rank below requirement");
        return Err(AuthError::Forbidden);
    }

    Ok(())
}

/// Check 4: the addressed subject is the caller, or the caller is an admin
pub fn check_subject_ownership(claims: &Claims, subject_id: Uuid) -> Result<(), AuthError> {
    let subject = claims.subject.ok_or(AuthError::Forbidden)?;

    if subject.user_id == subject_id {
        return Ok(());
    }

    if Role::from_rank(subject.role_rank).is_some_and(|r| r.is_admin()) {
        return Ok(());
    }

    tracing::debug!(caller = %subject.user_id, subject = %subject_id, "Subject mismatch");
    Err(AuthError::Forbidden)
}

// ============================================================================
// Axum middlewares
// ============================================================================

/// Middleware requiring a valid api-key token
pub async fn require_api_key(
    State(state): State<GateState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    verify_api_key(&state.codec, req.headers())?;
    Ok(next.run(req).await)
}

/// Middleware requiring a valid access token.
///
/// On success the parsed [`Claims`] are inserted into request extensions for
/// downstream checks and handlers.
pub async fn require_access_token(
    State(state): State<GateState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = extract_access_claims(&state.codec, req.headers())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware requiring a minimum role rank.
///
/// Must run after [`require_access_token`]; a missing claims extension is an
/// unauthenticated request, not a server error.
pub async fn require_min_role(
    State(required): State<Role>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AuthError::Unauthorized)?;
    check_min_role(claims, required)?;
    Ok(next.run(req).await)
}

/// Middleware requiring the path `user_id` to match the claims subject
/// (administrators override). Must run after [`require_access_token`].
pub async fn require_subject(
    Path(user_id): Path<Uuid>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AuthError::Unauthorized)?;
    check_subject_ownership(claims, user_id)?;
    Ok(next.run(req).await)
}
