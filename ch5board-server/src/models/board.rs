//! Board identifier validation
//!
//! Slug format: lowercase alphanumeric with hyphens/underscores

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for board identifiers
const MAX_BOARD_ID_LEN: usize = 32;

/// Slug pattern: starts with alphanumeric, allows hyphens/underscores
static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_-]{0,31}$").expect("invalid slug regex")
});

/// Validated board identifier (slug format, e.g. `news`, `zatsudan`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardId(String);

impl BoardId {
    /// Create a new board identifier, validating slug format.
    ///
    /// # Example
    /// ```
    /// use ch5board_server::models::BoardId;
    ///
    /// assert!(BoardId::new("zatsudan").is_ok());
    /// assert!(BoardId::new("News").is_err());  // uppercase
    /// assert!(BoardId::new("-news").is_err());  // starts with dash
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "boardId" });
        }

        if s.len() > MAX_BOARD_ID_LEN {
            return Err(ValidationError::TooLong {
                field: "boardId",
                max: MAX_BOARD_ID_LEN,
            });
        }

        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "boardId",
                reason: "must be lowercase alphanumeric with hyphens/underscores, starting with alphanumeric",
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the board id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for BoardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        assert!(BoardId::new("news").is_ok());
        assert!(BoardId::new("my_board").is_ok());
        assert!(BoardId::new("vip-2ch").is_ok());
        assert!(BoardId::new("a").is_ok());
        assert!(BoardId::new("1board").is_ok());
    }

    #[test]
    fn rejects_uppercase() {
        let err = BoardId::new("News").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn rejects_dash_start() {
        let err = BoardId::new("-news").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn rejects_empty() {
        let err = BoardId::new("").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn max_length() {
        assert!(BoardId::new(&"a".repeat(32)).is_ok());

        let err = BoardId::new(&"a".repeat(33)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 32, .. }));
    }
}
