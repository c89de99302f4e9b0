//! Auth Router
//!
//! Route wiring with the Authorization Gate attached per endpoint. Every
//! route sits behind the api-key check; token, role, and ownership checks
//! stack on the routes that need them.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{RoleRepository, SessionRepository, UserRepository};
use crate::domain::value_object::role::Role;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    GateState, require_access_token, require_api_key, require_min_role, require_subject,
};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + SessionRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: config.clone(),
    };
    let gate = GateState::new(config);

    // Pre-login endpoints: api-key only
    let public = Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/admin/register", post(handlers::admin_register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/roles", get(handlers::list_roles::<R>));

    // Authenticated endpoints
    let session = Router::new()
        .route("/signout", post(handlers::sign_out::<R>))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            require_access_token,
        ));

    // Subject-addressed endpoints: ownership check on top of the token check
    let profile = Router::new()
        .route("/users/{user_id}", get(handlers::get_profile::<R>))
        .route_layer(middleware::from_fn(require_subject))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            require_access_token,
        ));

    // Administrator-rank endpoints
    let admin = Router::new()
        .route(
            "/admin/sessions/cleanup",
            post(handlers::cleanup_sessions::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            Role::Admin,
            require_min_role,
        ))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            require_access_token,
        ));

    Router::new()
        .merge(public)
        .merge(session)
        .merge(profile)
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(gate, require_api_key))
        .with_state(state)
}
