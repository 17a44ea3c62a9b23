//! Response (reply) field validation
//!
//! Every field of a submitted post is validated here, before any
//! repository is touched.

use ch5board_core::PostingRules;

use super::validation::char_len;
use super::ValidationError;

/// Maximum length for the name and mail fields
const MAX_NAME_CHARS: usize = 64;
const MAX_MAIL_CHARS: usize = 64;

/// Maximum length for an image reference
const MAX_IMAGE_URL_CHARS: usize = 2048;

/// Validated response body
///
/// Stored verbatim: leading whitespace and blank lines are part of the post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody(String);

impl ResponseBody {
    /// Create a new body.
    ///
    /// # Rules
    /// - Not blank (whitespace-only counts as empty)
    /// - At most `max_chars` characters
    ///
    /// # Example
    /// ```
    /// use ch5board_server::models::ResponseBody;
    ///
    /// assert!(ResponseBody::new(">>1\nいい感じですね", 2000).is_ok());
    /// assert!(ResponseBody::new("", 2000).is_err());
    /// assert!(ResponseBody::new(" \n ", 2000).is_err());
    /// ```
    pub fn new(s: &str, max_chars: usize) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "body" });
        }

        if char_len(s) > max_chars {
            return Err(ValidationError::TooLong {
                field: "body",
                max: max_chars,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Display name, falling back to the board default when blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterName(String);

impl PosterName {
    pub fn new(s: Option<&str>, default_name: &str) -> Result<Self, ValidationError> {
        let trimmed = s.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Ok(Self(default_name.to_owned()));
        }

        if char_len(trimmed) > MAX_NAME_CHARS {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_CHARS,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contact ("mail") field. Blank input means no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail(String);

impl Mail {
    pub fn new(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        let trimmed = s.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if char_len(trimmed) > MAX_MAIL_CHARS {
            return Err(ValidationError::TooLong {
                field: "mail",
                max: MAX_MAIL_CHARS,
            });
        }

        Ok(Some(Self(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Image reference: an absolute http(s) URL or a site-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        let trimmed = s.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if char_len(trimmed) > MAX_IMAGE_URL_CHARS {
            return Err(ValidationError::TooLong {
                field: "imageUrl",
                max: MAX_IMAGE_URL_CHARS,
            });
        }

        let allowed = trimmed.starts_with("https://")
            || trimmed.starts_with("http://")
            || (trimmed.starts_with('/') && !trimmed.starts_with("//"));
        if !allowed || trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "imageUrl",
                reason: "must be an http(s) URL or a path starting with '/'",
            });
        }

        Ok(Some(Self(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fully validated post, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResponse {
    pub name: PosterName,
    pub mail: Option<Mail>,
    pub body: ResponseBody,
    pub image_url: Option<ImageUrl>,
}

impl NewResponse {
    pub fn new(
        name: Option<&str>,
        mail: Option<&str>,
        body: &str,
        image_url: Option<&str>,
        rules: &PostingRules,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            body: ResponseBody::new(body, rules.max_body_chars)?,
            name: PosterName::new(name, &rules.default_name)?,
            mail: Mail::new(mail)?,
            image_url: ImageUrl::new(image_url)?,
        })
    }

    pub fn mail_str(&self) -> Option<&str> {
        self.mail.as_ref().map(Mail::as_str)
    }

    pub fn image_url_str(&self) -> Option<&str> {
        self.image_url.as_ref().map(ImageUrl::as_str)
    }
}

/// Identity derived for the submitting client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poster {
    /// Daily pseudonymous ID shown next to the post
    pub user_id: String,
    /// Address hash, stored but never returned to clients
    pub ip_hash: String,
}
