//! User Name Value Object
//!
//! ユーザー名はアカウントの公開識別子（ハンドル）。大文字入力は受け付けるが
//! 正規形は小文字で、一意性判定は正規形で行う。
//!
//! ## 不変条件
//! - 長さ: 3〜30文字（NFKC正規化後）
//! - 使用可能文字: a-z, 0-9, _ . -
//! - 先頭・末尾: 英数字または `_`
//! - 英数字を最低1文字含む

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for a user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for a user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 30;

/// Digits appended to generated OAuth usernames
const SUGGESTION_SUFFIX_LEN: usize = 4;

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// Empty after normalization
    Empty,

    /// Shorter than [`USER_NAME_MIN_LENGTH`]
    TooShort { length: usize, min: usize },

    /// Longer than [`USER_NAME_MAX_LENGTH`]
    TooLong { length: usize, max: usize },

    /// Contains a character outside a-z, 0-9, `_`, `.`, `-`
    InvalidCharacter { char: char, position: usize },

    /// Starts or ends with a separator character
    InvalidBoundary { char: char },

    /// Contains no letter or digit at all
    NoAlphanumeric,
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "User name is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only a-z, 0-9, _, ., - are allowed"
                )
            }
            Self::InvalidBoundary { char } => {
                write!(
                    f,
                    "User name cannot start or end with '{char}'. Use a-z, 0-9, or _"
                )
            }
            Self::NoAlphanumeric => {
                write!(f, "User name must contain at least one letter or digit")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, lowercase-canonical user name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Create a new UserName from raw input
    ///
    /// Applies NFKC normalization, trims, lowercases, then validates.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let canonical = Self::normalize(input.as_ref());
        Self::validate(&canonical)?;
        Ok(Self(canonical))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive a username for a new OAuth account
    ///
    /// Sanitizes the display name (falling back to the email local part)
    /// to `[a-z0-9]` and appends four random digits. Always yields a
    /// valid name; collisions are the caller's concern (retry with a
    /// fresh suffix).
    pub fn suggest(display_name: &str, email_local_part: &str) -> Self {
        use rand::Rng;

        let mut base = Self::sanitize(display_name);
        if base.is_empty() {
            base = Self::sanitize(email_local_part);
        }
        if base.is_empty() {
            base = "user".to_string();
        }
        base.truncate(USER_NAME_MAX_LENGTH - SUGGESTION_SUFFIX_LEN);

        let mut rng = rand::rng();
        let suffix: String = (0..SUGGESTION_SUFFIX_LEN)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();

        Self(format!("{base}{suffix}"))
    }

    /// Get the canonical (lowercase) user name
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn normalize(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_lowercase()
    }

    /// Keep only ASCII lowercase letters and digits
    fn sanitize(input: &str) -> String {
        Self::normalize(input)
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect()
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

        for (pos, ch) in canonical.chars().enumerate() {
            if !Self::is_valid_char(ch) {
                return Err(UserNameError::InvalidCharacter {
                    char: ch,
                    position: pos,
                });
            }
        }

        let first = canonical.chars().next().unwrap();
        if !Self::is_valid_boundary_char(first) {
            return Err(UserNameError::InvalidBoundary { char: first });
        }
        let last = canonical.chars().next_back().unwrap();
        if !Self::is_valid_boundary_char(last) {
            return Err(UserNameError::InvalidBoundary { char: last });
        }

        if !canonical.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(UserNameError::NoAlphanumeric);
        }

        Ok(())
    }

    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
    }

    #[inline]
    fn is_valid_boundary_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
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
