// AssetStore - Content-addressable asset storage
// Copyright (C) 2025 AssetStore Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Errors raised by storage backends
//!
//! Backends return `anyhow::Error` at the port boundary. Conditions callers
//! branch on are raised as a [`StorageError`] inside it, so they survive the
//! trip and can be recovered with [`is_not_found`] or a downcast.

use std::io;
use thiserror::Error;

/// Result alias for key checks and other typed storage helpers
pub type StorageResult<T> = Result<T, StorageError>;

/// Typed storage failure
#[derive(Error, Debug)]
pub enum StorageError {
    /// No object is stored under the key
    #[error("object not found: {0}")]
    NotFound(String),

    /// The filesystem refused access
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Raw I/O failure without a more specific meaning
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Key is empty, absolute, escapes the root or is reserved
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Backend-specific failure, including simulated ones
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Anything else, passed through untouched
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorageError {
    /// Missing object under `key`
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        StorageError::NotFound(key.into())
    }

    /// Access refused
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        StorageError::PermissionDenied(msg.into())
    }

    /// Unusable key
    pub fn invalid_key<S: Into<String>>(msg: S) -> Self {
        StorageError::InvalidKey(msg.into())
    }

    /// Backend failure
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        StorageError::Backend(msg.into())
    }

    /// `NotFound`?
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    /// `PermissionDenied`?
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StorageError::PermissionDenied(_))
    }

    /// `InvalidKey`?
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, StorageError::InvalidKey(_))
    }
}

/// Whether a backend error means "no such object"
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<StorageError>()
        .is_some_and(StorageError::is_not_found)
}

/// Whether a backend refused the key itself rather than the operation
pub fn is_invalid_key(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<StorageError>()
        .is_some_and(StorageError::is_invalid_key)
}

/// Check a key before it reaches a backend
///
/// Rejects empty keys, absolute paths and any `..` segment, with either
/// separator.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key("key cannot be empty"));
    }
    if key.starts_with(['/', '\\']) {
        return Err(StorageError::invalid_key(format!("key must be relative: {}", key)));
    }
    if key.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(StorageError::invalid_key(format!("key escapes storage root: {}", key)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_key() {
        let err = StorageError::not_found("reports/aaf4c61ddc/q1.txt");
        assert!(err.is_not_found());
        assert!(!err.is_invalid_key());
        assert_eq!(err.to_string(), "object not found: reports/aaf4c61ddc/q1.txt");
    }

    #[test]
    fn predicates_match_their_variant() {
        assert!(StorageError::permission_denied("assets/ is read-only").is_permission_denied());
        assert!(StorageError::invalid_key("").is_invalid_key());
        assert!(matches!(
            StorageError::from(io::Error::other("short write")),
            StorageError::Io(_)
        ));
    }

    #[test]
    fn not_found_survives_anyhow() {
        let err: anyhow::Error = StorageError::not_found("a/b.txt").into();
        assert!(is_not_found(&err));
        assert!(!is_not_found(&anyhow::anyhow!("disk full")));
        assert!(!is_not_found(&StorageError::backend("simulated").into()));
    }

    #[test]
    fn key_validation() {
        for ok in ["folder/abcdef0123/file.txt", "file", "a/.hidden/b", "..name"] {
            assert!(validate_key(ok).is_ok(), "{}", ok);
        }
        for bad in ["", "/etc/passwd", "\\share\\x", "../outside", "a/../../b", "a\\..\\b"] {
            assert!(validate_key(bad).unwrap_err().is_invalid_key(), "{}", bad);
        }
    }
}
