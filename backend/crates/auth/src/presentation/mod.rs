//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and the Authorization Gate middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{
    GateState, check_min_role, check_subject_ownership, extract_access_claims, require_access_token,
    require_api_key, require_min_role, require_subject, verify_api_key,
};
pub use router::{auth_router, auth_router_generic};
