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

//! Storage port for AssetStore
//!
//! This crate defines the backend contract the asset store writes through,
//! plus two implementations:
//! - Local filesystem ([`LocalBackend`])
//! - In-memory mock for tests ([`mock::MockBackend`])
//!
//! # Core Concepts
//!
//! - **Keys**: opaque, path-like identifiers (`reports/aaf4c61ddc/q1.txt`).
//!   Backends treat them as opaque and never parse them.
//! - **Objects**: arbitrary binary data associated with a key
//! - **Capabilities**: backends that can hand out direct URLs expose
//!   [`UrlResolvable`] through [`StorageBackend::as_url_resolvable`]
//!
//! All operations are blocking and run on the caller's thread. Backends give
//! no atomicity guarantee across separate calls: an `exists` followed by a
//! `put` can race with another writer.
//!
//! # Examples
//!
//! ```rust,no_run
//! use assetstore_storage::{StorageBackend, mock::MockBackend};
//!
//! fn main() -> anyhow::Result<()> {
//!     let storage = MockBackend::new();
//!
//!     storage.put("documents/resume.pdf", b"PDF content")?;
//!     assert_eq!(storage.get("documents/resume.pdf")?, b"PDF content");
//!     assert!(storage.exists("documents/resume.pdf")?);
//!
//!     storage.delete("documents/resume.pdf")?;
//!     // Idempotent
//!     storage.delete("documents/resume.pdf")?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod local;
pub mod mime;
pub mod mock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Debug;
use std::io::Read;

pub use error::{is_invalid_key, is_not_found, validate_key, StorageError, StorageResult};
pub use local::LocalBackend;

/// Metadata describing a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMetadata {
    /// Size in bytes
    pub size: u64,
    /// MIME type guessed from the key's extension
    pub mime_type: Option<String>,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Capability for backends whose objects can be linked to directly
///
/// Not every backend can produce a URL; callers dispatch on the presence of
/// this capability via [`StorageBackend::as_url_resolvable`].
pub trait UrlResolvable {
    /// URL for the object stored under `key`, or `None` if the object cannot
    /// be linked to.
    fn public_url(&self, key: &str) -> Option<String>;
}

/// Storage backend trait for object storage operations
///
/// # Error Handling
///
/// All operations return `anyhow::Result<T>`. Operations should return `Err` for:
/// - `get` / `get_stream` / `metadata`: key doesn't exist
///   ([`StorageError::NotFound`]) or I/O failure
/// - `put` / `put_stream`: permission, quota or I/O failure
/// - any operation given an invalid key ([`StorageError::InvalidKey`])
///
/// `delete` succeeds for non-existent objects.
///
/// ```rust,no_run
/// # use assetstore_storage::{StorageBackend, mock::MockBackend};
/// # fn main() -> anyhow::Result<()> {
/// let backend: Box<dyn StorageBackend> = Box::new(MockBackend::new());
///
/// backend.put("my_key", b"my_data")?;
/// assert_eq!(backend.get("my_key")?, b"my_data");
/// # Ok(())
/// # }
/// ```
pub trait StorageBackend: Send + Sync + Debug {
    /// Check if an object exists
    fn exists(&self, key: &str) -> anyhow::Result<bool>;

    /// Retrieve an object by its key
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;

    /// Open an object for streaming reads
    ///
    /// The returned reader is owned by the caller.
    fn get_stream(&self, key: &str) -> anyhow::Result<Box<dyn Read + Send>>;

    /// Store an object with the given key, replacing any previous content
    fn put(&self, key: &str, data: &[u8]) -> anyhow::Result<()>;

    /// Store an object by draining `reader`
    ///
    /// The reader stays owned by the caller and is not closed.
    /// Returns the number of bytes written.
    fn put_stream(&self, key: &str, reader: &mut dyn Read) -> anyhow::Result<u64>;

    /// Delete an object. Deleting a missing object succeeds.
    fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Size, MIME type and modification time of an object
    fn metadata(&self, key: &str) -> anyhow::Result<ObjectMetadata>;

    /// List keys starting with `prefix`, sorted
    fn list_objects(&self, prefix: &str) -> anyhow::Result<Vec<String>>;

    /// URL capability, if this backend has one
    fn as_url_resolvable(&self) -> Option<&dyn UrlResolvable> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn _check_object_safe(_: &dyn StorageBackend) {}
    }

    #[test]
    fn metadata_serializes() {
        let meta = ObjectMetadata {
            size: 5,
            mime_type: Some("text/plain".to_string()),
            modified: Utc::now(),
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"size\":5"));
        assert!(json.contains("text/plain"));
    }
}
