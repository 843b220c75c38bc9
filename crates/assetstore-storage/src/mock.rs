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

//! In-memory mock storage backend for testing
//!
//! Provides a thread-safe, in-memory implementation of [`StorageBackend`](crate::StorageBackend)
//! using `Arc<RwLock<HashMap>>`. Beyond plain storage it counts physical
//! writes, can be told to fail every write, and can advertise a URL base so
//! the [`UrlResolvable`] capability can be exercised.
//!
//! # Examples
//!
//! ```rust,no_run
//! use assetstore_storage::{StorageBackend, mock::MockBackend};
//!
//! fn main() -> anyhow::Result<()> {
//!     let storage = MockBackend::new();
//!
//!     storage.put("test.bin", b"hello world")?;
//!     assert_eq!(storage.get("test.bin")?, b"hello world");
//!     assert_eq!(storage.write_count(), 1);
//!
//!     storage.delete("test.bin")?;
//!     assert!(!storage.exists("test.bin")?);
//!     Ok(())
//! }
//! ```

use crate::error::{validate_key, StorageError};
use crate::mime::guess_mime_type;
use crate::{ObjectMetadata, StorageBackend, UrlResolvable};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct MockObject {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

/// In-memory mock storage backend for testing
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<RwLock<HashMap<String, MockObject>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
    listed: Arc<RwLock<Vec<String>>>,
    url_base: Option<String>,
}

impl MockBackend {
    /// Create a new empty mock storage backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock storage backend with initial data
    pub fn with_data(initial_data: HashMap<String, Vec<u8>>) -> Self {
        let now = Utc::now();
        let store = initial_data
            .into_iter()
            .map(|(key, data)| (key, MockObject { data, modified: now }))
            .collect();

        MockBackend {
            store: Arc::new(RwLock::new(store)),
            ..Self::default()
        }
    }

    /// Advertise direct URLs of the form `{base}/{key}`
    pub fn with_public_url(mut self, base: impl Into<String>) -> Self {
        self.url_base = Some(base.into());
        self
    }

    /// Make every subsequent `put`/`put_stream` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful physical writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Prefixes passed to `list_objects`, in call order
    pub fn listed_prefixes(&self) -> Vec<String> {
        self.listed.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Get the current number of objects stored
    pub fn len(&self) -> usize {
        self.read_store().len()
    }

    /// Check if the storage is empty
    pub fn is_empty(&self) -> bool {
        self.read_store().is_empty()
    }

    /// Clear all stored objects
    pub fn clear(&self) {
        self.write_store().clear();
    }

    /// Get a sorted copy of all stored keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read_store().keys().cloned().collect();
        keys.sort();
        keys
    }

    // A poisoned lock only means another test thread panicked mid-write;
    // the map itself is still usable.
    fn read_store(&self) -> RwLockReadGuard<'_, HashMap<String, MockObject>> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, HashMap<String, MockObject>> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }

    fn record_write(&self, key: &str, data: Vec<u8>) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::backend(format!("simulated write failure: {}", key)).into());
        }

        self.write_store().insert(
            key.to_string(),
            MockObject {
                data,
                modified: Utc::now(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBackend")
            .field("url_base", &self.url_base)
            .finish()
    }
}

impl UrlResolvable for MockBackend {
    fn public_url(&self, key: &str) -> Option<String> {
        self.url_base
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), key))
    }
}

impl StorageBackend for MockBackend {
    fn exists(&self, key: &str) -> anyhow::Result<bool> {
        validate_key(key)?;
        Ok(self.read_store().contains_key(key))
    }

    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        validate_key(key)?;
        self.read_store()
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StorageError::not_found(key).into())
    }

    fn get_stream(&self, key: &str) -> anyhow::Result<Box<dyn Read + Send>> {
        let data = self.get(key)?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn put(&self, key: &str, data: &[u8]) -> anyhow::Result<()> {
        validate_key(key)?;
        self.record_write(key, data.to_vec())
    }

    fn put_stream(&self, key: &str, reader: &mut dyn Read) -> anyhow::Result<u64> {
        validate_key(key)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let len = data.len() as u64;
        self.record_write(key, data)?;
        Ok(len)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        validate_key(key)?;
        self.write_store().remove(key);
        Ok(())
    }

    fn metadata(&self, key: &str) -> anyhow::Result<ObjectMetadata> {
        validate_key(key)?;
        let store = self.read_store();
        let obj = store.get(key).ok_or_else(|| StorageError::not_found(key))?;

        Ok(ObjectMetadata {
            size: obj.data.len() as u64,
            mime_type: guess_mime_type(key).map(str::to_string),
            modified: obj.modified,
        })
    }

    fn list_objects(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        self.listed
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(prefix.to_string());
        let mut results: Vec<String> = self
            .read_store()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        results.sort();
        Ok(results)
    }

    fn as_url_resolvable(&self) -> Option<&dyn UrlResolvable> {
        self.url_base.as_ref().map(|_| self as &dyn UrlResolvable)
    }
}
