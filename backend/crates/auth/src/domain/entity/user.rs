//! User Entity
//!
//! The public principal projection and the credential record used during
//! login. The two are split so the password hash never rides along with data
//! that gets serialized into responses.

use crate::domain::value_object::{
    email::Email, role::Role, user_id::UserId, user_name::UserName, user_password::UserPassword,
};

/// Principal projection: what the API exposes about a user.
///
/// This is the passport-shaped materialization of a `users` row joined with
/// its role. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    pub user_name: UserName,
    pub role: Role,
}

/// Credential record for password verification during login.
///
/// Carries exactly what `Login` needs: the hash to verify against and the
/// identity/role to stamp into the token claims afterwards.
pub struct UserCredential {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    pub role: Role,
}
