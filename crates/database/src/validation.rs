//! Input validation for user-supplied profile and comment fields.

use std::fmt;

use url::Url;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username contains characters outside the allowed set.
    InvalidUsername(String),
    /// URL is not an absolute http(s) URL.
    InvalidUrl(String),
    /// Value too short.
    TooShort { field: String, min: usize, actual: usize },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUsername(msg) => write!(f, "Invalid username: {}", msg),
            ValidationError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            ValidationError::TooShort { field, min, actual } => {
                write!(f, "{} is too short ({} chars, min {})", field, actual, min)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Minimum username length in characters.
pub const MIN_USERNAME_LENGTH: usize = 2;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Maximum display name length in characters.
pub const MAX_FULL_NAME_LENGTH: usize = 50;

/// Maximum avatar URL length.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum comment length in characters.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Validate a username.
///
/// Letters (including Hangul), digits, `_` and `.` are allowed.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let username = username.trim();
    let len = username.chars().count();

    if len == 0 {
        return Err(ValidationError::Empty("username".to_string()));
    }

    if len < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: MIN_USERNAME_LENGTH,
            actual: len,
        });
    }

    if len > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
            actual: len,
        });
    }

    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '.'))
    {
        return Err(ValidationError::InvalidUsername(format!(
            "invalid character '{}'",
            c
        )));
    }

    Ok(())
}

/// Validate a display name.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();

    if len == 0 {
        return Err(ValidationError::Empty("full name".to_string()));
    }

    if len > MAX_FULL_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "full name".to_string(),
            max: MAX_FULL_NAME_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate an avatar URL (absolute http or https).
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::Empty("URL".to_string()));
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "URL".to_string(),
            max: MAX_URL_LENGTH,
            actual: url.len(),
        });
    }

    if url.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl("contains whitespace".to_string()));
    }

    let parsed = Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl(
            "must start with http:// or https://".to_string(),
        ));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidUrl("missing host".to_string())),
    }
}

/// Validate comment text.
pub fn validate_comment(content: &str) -> Result<(), ValidationError> {
    let len = content.trim().chars().count();

    if len == 0 {
        return Err(ValidationError::Empty("comment".to_string()));
    }

    if len > MAX_COMMENT_LENGTH {
        return Err(ValidationError::TooLong {
            field: "comment".to_string(),
            max: MAX_COMMENT_LENGTH,
            actual: len,
        });
    }

    Ok(())
}
