//! User Name Value Object
//!
//! Public handle used for display and uniqueness. Input is trimmed and
//! lowercased to a canonical form; the `users.username` unique constraint
//! operates on that canonical value.
//!
//! ## Invariants
//! - 3 to 32 characters
//! - ASCII lowercase letters, digits, `_`, `.`, `-`
//! - Starts and ends with a letter or digit
//! - No consecutive dots
//! - Not a reserved word

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 32;

/// Handles that collide with routes or operational accounts
const RESERVED_WORDS: &[&str] = &[
    "admin", "administrator", "root", "system", "support", "api", "anonymous",
];

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char },
    InvalidStartOrEnd,
    ConsecutiveDots,
    Reserved { word: String },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "Username is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "Username is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char } => {
                write!(
                    f,
                    "Invalid character '{char}'. Only a-z, 0-9, _, ., - are allowed"
                )
            }
            Self::InvalidStartOrEnd => {
                write!(f, "Username must start and end with a letter or digit")
            }
            Self::ConsecutiveDots => {
                write!(f, "Username cannot contain consecutive dots (..)")
            }
            Self::Reserved { word } => {
                write!(f, "'{word}' is a reserved username")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, canonical (lowercase) user name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Create a new UserName from raw input
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let canonical = input.as_ref().trim().to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self(canonical))
    }

    /// Create from database values (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        if canonical.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = canonical.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for ch in canonical.chars() {
            if !(ch.is_ascii_lowercase()
                || ch.is_ascii_digit()
                || ch == '_'
                || ch == '.'
                || ch == '-')
            {
                return Err(UserNameError::InvalidCharacter { char: ch });
            }
        }

        let first = canonical.chars().next().unwrap();
        let last = canonical.chars().next_back().unwrap();
        if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
            return Err(UserNameError::InvalidStartOrEnd);
        }

        if canonical.contains("..") {
            return Err(UserNameError::ConsecutiveDots);
        }

        if RESERVED_WORDS.contains(&canonical) {
            return Err(UserNameError::Reserved {
                word: canonical.to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(UserName::new("alice").is_ok());
        assert!(UserName::new("alice_123").is_ok());
        assert!(UserName::new("alice.bob").is_ok());
        assert!(UserName::new("alice-bob").is_ok());
    }

    #[test]
    fn test_normalization() {
        let name = UserName::new("  ALICE  ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            UserName::new("ab"),
            Err(UserNameError::TooShort { length: 2, min: 3 })
        ));
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(matches!(
            UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
            Err(UserNameError::TooLong { .. })
        ));
        assert!(matches!(UserName::new(""), Err(UserNameError::Empty)));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            UserName::new("alice@bob"),
            Err(UserNameError::InvalidCharacter { char: '@' })
        ));
        assert!(matches!(
            UserName::new("alice bob"),
            Err(UserNameError::InvalidCharacter { char: ' ' })
        ));
        assert!(matches!(
            UserName::new("日本語です"),
            Err(UserNameError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_start_end_rules() {
        assert!(matches!(
            UserName::new(".alice"),
            Err(UserNameError::InvalidStartOrEnd)
        ));
        assert!(matches!(
            UserName::new("alice_"),
            Err(UserNameError::InvalidStartOrEnd)
        ));
    }

    #[test]
    fn test_consecutive_dots() {
        assert!(matches!(
            UserName::new("alice..bob"),
            Err(UserNameError::ConsecutiveDots)
        ));
        assert!(UserName::new("alice.bob.c").is_ok());
    }

    #[test]
    fn test_reserved_words() {
        assert!(matches!(
            UserName::new("admin"),
            Err(UserNameError::Reserved { word }) if word == "admin"
        ));
        assert!(matches!(
            UserName::new("ROOT"),
            Err(UserNameError::Reserved { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let name = UserName::new("alice").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"alice\"");

        let parsed: UserName = serde_json::from_str("\"ALICE\"").unwrap();
        assert_eq!(parsed.as_str(), "alice");

        let invalid: Result<UserName, _> = serde_json::from_str("\"ab\"");
        assert!(invalid.is_err());
    }
}
