//! Auth (Credentials & Sessions) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, token codec, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Customer/administrator registration with email + username + password
//! - Login issuing a signed access/refresh token pair (a Passport)
//! - Server-side refresh sessions with atomic token rotation
//! - Role-based and subject-ownership authorization checks
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Access and refresh tokens signed with independent HMAC keys
//! - Refresh rotation keyed on the previous token value, so a stale
//!   token loses the race instead of silently succeeding
//! - Sign-out deletes the session; access tokens expire naturally

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
