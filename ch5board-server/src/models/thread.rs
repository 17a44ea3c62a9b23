//! Thread title validation and listing order

use std::str::FromStr;

use serde::Deserialize;

use super::validation::char_len;
use super::ValidationError;

/// Validated thread title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTitle(String);

impl ThreadTitle {
    /// Create a new thread title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - At most `max_chars` characters
    ///
    /// # Example
    /// ```
    /// use ch5board_server::models::ThreadTitle;
    ///
    /// assert!(ThreadTitle::new("はじめてのスレッド", 48).is_ok());
    /// assert!(ThreadTitle::new("", 48).is_err());
    /// assert!(ThreadTitle::new("   ", 48).is_err());  // whitespace only
    /// ```
    pub fn new(s: &str, max_chars: usize) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        if char_len(trimmed) > max_chars {
            return Err(ValidationError::TooLong {
                field: "title",
                max: max_chars,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the title as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ThreadTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Thread listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ThreadSort {
    /// Most recently bumped first
    #[default]
    Updated,
    /// Newest thread first
    Created,
    /// Most replies first
    Res,
}

impl ThreadSort {
    /// SQL ORDER BY clause. Safe to interpolate: the set is closed.
    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Updated => "t.updated_at DESC, t.id DESC",
            Self::Created => "t.created_at DESC, t.id DESC",
            Self::Res => "t.res_count DESC, t.id DESC",
        }
    }
}

impl FromStr for ThreadSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated" => Ok(Self::Updated),
            "created" => Ok(Self::Created),
            "res" => Ok(Self::Res),
            other => Err(ValidationError::InvalidVariant {
                field: "sort",
                value: other.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for ThreadSort {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_titles() {
        assert!(ThreadTitle::new("My Thread", 48).is_ok());
        assert!(ThreadTitle::new("a", 48).is_ok());
        assert!(ThreadTitle::new("  Trimmed  ", 48).is_ok());
    }

    #[test]
    fn rejects_whitespace_only() {
        assert!(matches!(
            ThreadTitle::new("   ", 48).unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn max_length_counts_characters() {
        let title_48 = "あ".repeat(48);
        assert!(ThreadTitle::new(&title_48, 48).is_ok());

        let title_49 = "あ".repeat(49);
        let err = ThreadTitle::new(&title_49, 48).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 48, .. }));
    }

    #[test]
    fn trims_whitespace() {
        let title = ThreadTitle::new("  hello  ", 48).unwrap();
        assert_eq!(title.as_str(), "hello");
    }

    #[test]
    fn parses_sort() {
        assert_eq!("updated".parse::<ThreadSort>().unwrap(), ThreadSort::Updated);
        assert_eq!("created".parse::<ThreadSort>().unwrap(), ThreadSort::Created);
        assert_eq!("res".parse::<ThreadSort>().unwrap(), ThreadSort::Res);
        assert!(matches!(
            "momentum".parse::<ThreadSort>().unwrap_err(),
            ValidationError::InvalidVariant { field: "sort", .. }
        ));
    }
}
