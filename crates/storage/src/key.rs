//! Bucket and key validation.

use crate::error::{Result, StorageError};

/// Check a bucket name and object key.
///
/// Buckets are lowercase letters, digits and `-`. Keys are `/`-separated
/// relative paths whose segments are non-empty, not `.` or `..`, and free of
/// backslashes and control characters.
pub fn validate_key(bucket: &str, key: &str) -> Result<()> {
    if bucket.is_empty()
        || !bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(StorageError::InvalidKey(format!("bad bucket {bucket:?}")));
    }

    if key.is_empty() || key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!("bad key {key:?}")));
    }

    if key.chars().any(|c| c == '\\' || c.is_control()) {
        return Err(StorageError::InvalidKey(format!("bad characters in {key:?}")));
    }

    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(format!("bad path segment in {key:?}")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(validate_key("generated-images", "user-1/abc.png").is_ok());
        assert!(validate_key("doodle-images", "originals/u1/x.v2.png").is_ok());
    }

    #[test]
    fn test_rejects_traversal() {
        for key in ["../etc/passwd", "a/../../b", "/abs.png", "a//b", "./a", "a\\b", ""] {
            assert!(
                matches!(validate_key("generated-images", key), Err(StorageError::InvalidKey(_))),
                "accepted {key:?}"
            );
        }
    }

    #[test]
    fn test_rejects_bad_buckets() {
        assert!(validate_key("", "a.png").is_err());
        assert!(validate_key("../up", "a.png").is_err());
        assert!(validate_key("Images", "a.png").is_err());
    }
}
