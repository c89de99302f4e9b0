use serde::{Deserialize, Serialize};
use std::fmt;

/// Principal role, ordered by rank.
///
/// Ranks mirror the `roles` reference table; authorization compares ranks
/// (`role.rank() >= required.rank()`), so adding a higher role later does
/// not invalidate existing checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Role {
    #[default]
    Customer = 1,
    Admin = 2,
}

impl Role {
    /// Numeric rank, as stored in `users.role_id` and token claims
    #[inline]
    pub const fn rank(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn title(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// True when this role satisfies the required minimum
    #[inline]
    pub const fn meets(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Look up a role by rank. Unknown ranks are rejected, not defaulted;
    /// a bad rank in a token or row must fail loudly.
    #[inline]
    pub fn from_rank(rank: i16) -> Option<Self> {
        match rank {
            1 => Some(Role::Customer),
            2 => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ranks() {
        assert_eq!(Role::Customer.rank(), 1);
        assert_eq!(Role::Admin.rank(), 2);
    }

    #[test]
    fn test_role_from_rank() {
        assert_eq!(Role::from_rank(1), Some(Role::Customer));
        assert_eq!(Role::from_rank(2), Some(Role::Admin));
        assert_eq!(Role::from_rank(0), None);
        assert_eq!(Role::from_rank(99), None);
    }

    #[test]
    fn test_role_meets() {
        assert!(Role::Customer.meets(Role::Customer));
        assert!(!Role::Customer.meets(Role::Admin));
        assert!(Role::Admin.meets(Role::Customer));
        assert!(Role::Admin.meets(Role::Admin));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Customer.to_string(), "customer");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
