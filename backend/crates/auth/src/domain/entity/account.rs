//! Account Creation Variants
//!
//! Registration produces one of two principal kinds, selected by an explicit
//! enum at the call site. Both variants insert into the same `users` table;
//! only the fixed role rank differs. Creation is two-phase: the insert
//! returns the new id, and `UserRepository::find_profile` is the shared
//! pure-read materialization step.

use crate::domain::value_object::{
    email::Email, role::Role, user_name::UserName, user_password::UserPassword,
};

/// Which kind of principal a registration creates.
///
/// Selection is always by this explicit flag-derived enum, never inferred
/// from request content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Customer,
    Admin,
}

impl AccountKind {
    /// Map the handler's `is_admin` flag to a variant
    #[inline]
    pub const fn from_is_admin(is_admin: bool) -> Self {
        if is_admin {
            AccountKind::Admin
        } else {
            AccountKind::Customer
        }
    }

    /// The fixed role each variant registers with
    #[inline]
    pub const fn role(&self) -> Role {
        match self {
            AccountKind::Customer => Role::Customer,
            AccountKind::Admin => Role::Admin,
        }
    }
}

/// Validated, hashed registration data ready for insertion.
///
/// The password must already be hashed; `NewAccount` never holds a raw
/// secret.
pub struct NewAccount {
    pub email: Email,
    pub user_name: UserName,
    pub password_hash: UserPassword,
    pub kind: AccountKind,
}

impl NewAccount {
    pub fn new(
        email: Email,
        user_name: UserName,
        password_hash: UserPassword,
        kind: AccountKind,
    ) -> Self {
        Self {
            email,
            user_name,
            password_hash,
            kind,
        }
    }

    /// Role rank stored in `users.role_id`
    #[inline]
    pub fn role_rank(&self) -> i16 {
        self.kind.role().rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_is_admin() {
        assert_eq!(AccountKind::from_is_admin(false), AccountKind::Customer);
        assert_eq!(AccountKind::from_is_admin(true), AccountKind::Admin);
    }

    #[test]
    fn test_kind_fixed_roles() {
        assert_eq!(AccountKind::Customer.role(), Role::Customer);
        assert_eq!(AccountKind::Admin.role(), Role::Admin);
        assert_eq!(AccountKind::Customer.role().rank(), 1);
        assert_eq!(AccountKind::Admin.role().rank(), 2);
    }
}
