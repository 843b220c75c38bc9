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

//! Store-level error taxonomy
//!
//! Input, conflict, allocation-exhaustion and backend I/O failures each get
//! their own variant so callers can match on them. Backend failures always
//! carry the file ID they were raised for.

use assetstore_storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the asset store, adapters and generated-asset cache
#[derive(Error, Debug)]
pub enum StoreError {
    /// Empty filename, unusable variant or similar caller mistake
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Local source file for `store_from_local_path` is missing
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Hash too short or not hexadecimal
    #[error("invalid content hash: {0:?}")]
    InvalidHash(String),

    /// Target exists and the conflict policy is `Exception`
    #[error("asset already exists: {file_id}")]
    AlreadyExists {
        /// Taken file ID
        file_id: String,
    },

    /// The rename generator ran out of candidates
    #[error("could not allocate a free name for {file_id} after {attempts} attempts")]
    RenameExhausted {
        /// File ID that was originally requested
        file_id: String,
        /// Number of candidates tried
        attempts: usize,
    },

    /// Nothing stored under the file ID
    #[error("asset not found: {file_id}")]
    NotFound {
        /// File ID that was looked up
        file_id: String,
    },

    /// Backend port failure for a specific file ID
    #[error("storage backend failed for {file_id}: {source}")]
    Backend {
        /// File ID the operation targeted
        file_id: String,
        /// Underlying backend error
        #[source]
        source: anyhow::Error,
    },

    /// A generated-asset producer failed
    #[error("failed to generate asset {key}: {source}")]
    Generation {
        /// Cache key being produced
        key: String,
        /// Producer error
        #[source]
        source: anyhow::Error,
    },

    /// Local I/O failure (source files, spool files, declaration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend construction or root resolution failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Wrap a backend error, turning a backend `NotFound` into
    /// [`StoreError::NotFound`] and a refused key into
    /// [`StoreError::InvalidInput`]
    pub fn backend(file_id: impl Into<String>, source: anyhow::Error) -> Self {
        let file_id = file_id.into();
        if assetstore_storage::is_not_found(&source) {
            StoreError::NotFound { file_id }
        } else if assetstore_storage::is_invalid_key(&source) {
            StoreError::InvalidInput(format!("{}: {}", file_id, source))
        } else {
            StoreError::Backend { file_id, source }
        }
    }

    /// Create an input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        StoreError::InvalidInput(msg.into())
    }

    /// Whether a retry under a different conflict policy could succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }

    /// Whether the error means "no such asset"
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// File ID the error refers to, if any
    pub fn file_id(&self) -> Option<&str> {
        match self {
            StoreError::AlreadyExists { file_id }
            | StoreError::RenameExhausted { file_id, .. }
            | StoreError::NotFound { file_id }
            | StoreError::Backend { file_id, .. } => Some(file_id),
            _ => None,
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_not_found_is_mapped() {
        let err = StoreError::backend("a/b.txt", StorageError::not_found("a/b.txt").into());
        assert!(err.is_not_found());
        assert_eq!(err.file_id(), Some("a/b.txt"));
    }

    #[test]
    fn backend_errors_keep_file_id() {
        let err = StoreError::backend("x/y.bin", anyhow::anyhow!("disk full"));
        assert!(matches!(err, StoreError::Backend { .. }));
        let msg = err.to_string();
        assert!(msg.contains("x/y.bin"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn refused_key_is_an_input_error() {
        let source = StorageError::invalid_key("hidden directory segment in key: .well-known/x.txt");
        let err = StoreError::backend(".well-known/aaf4c61ddc/x.txt", source.into());
        assert!(matches!(err, StoreError::InvalidInput(ref msg) if msg.contains(".well-known")));
        assert_eq!(err.file_id(), None);
    }

    #[test]
    fn conflict_predicate() {
        let err = StoreError::AlreadyExists {
            file_id: "q1.txt".to_string(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_not_found());

        let err = StoreError::RenameExhausted {
            file_id: "q1.txt".to_string(),
            attempts: 3,
        };
        assert!(!err.is_conflict());
        assert!(err.to_string().contains("3 attempts"));
    }
}
