//! Domain Layer
//!
//! Contains entities, value objects, the token codec, and repository traits.

pub mod entity;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{account::AccountKind, passport::Passport, session::Session, user::User};
pub use repository::{RoleRepository, SessionRepository, UserRepository};
pub use token::{Claims, TokenCodec, TokenKind, TokenSubject};
