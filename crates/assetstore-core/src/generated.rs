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

//! Check-or-create cache for regenerable content
//!
//! Entries are addressed by a flat, caller-chosen key such as
//! `thumbnails/photo-120x80.png`, never by content hash. The cache has no
//! eviction of its own; entries live until [`GeneratedAssetCache::invalidate`].

use crate::error::{StoreError, StoreResult};
use assetstore_storage::{validate_key, StorageBackend, StorageError};
use std::sync::Arc;
use tracing::{debug, info};

/// Memoizing cache for derived assets
#[derive(Debug, Clone)]
pub struct GeneratedAssetCache {
    backend: Arc<dyn StorageBackend>,
}

impl GeneratedAssetCache {
    /// Cache over `backend`
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        GeneratedAssetCache { backend }
    }

    /// Cached bytes for `key`, produced and stored on a miss
    ///
    /// Returns `Ok(None)` when the entry is missing and no producer is given.
    /// A producer failure is reported as [`StoreError::Generation`] and
    /// nothing is stored.
    pub fn get_or_create<P>(&self, key: &str, producer: Option<P>) -> StoreResult<Option<Vec<u8>>>
    where
        P: FnOnce() -> anyhow::Result<Vec<u8>>,
    {
        let key = checked_key(key)?;

        if self.has(key)? {
            debug!(key = %key, "Generated asset cache hit");
            return self
                .backend
                .get(key)
                .map(Some)
                .map_err(|e| StoreError::backend(key, e));
        }

        match producer {
            Some(producer) => self.produce(key, producer).map(Some),
            None => {
                debug!(key = %key, "Generated asset cache miss without producer");
                Ok(None)
            }
        }
    }

    /// Cached bytes for `key`, without producing on a miss
    pub fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.get_or_create(key, None::<fn() -> anyhow::Result<Vec<u8>>>)
    }

    /// URL for `key`, producing the entry first on a miss
    ///
    /// `Ok(None)` when the entry is missing without a producer, or when the
    /// backend cannot hand out URLs.
    pub fn get_url_or_create<P>(&self, key: &str, producer: Option<P>) -> StoreResult<Option<String>>
    where
        P: FnOnce() -> anyhow::Result<Vec<u8>>,
    {
        let key = checked_key(key)?;

        if !self.has(key)? {
            match producer {
                Some(producer) => {
                    self.produce(key, producer)?;
                }
                None => return Ok(None),
            }
        }

        Ok(self
            .backend
            .as_url_resolvable()
            .and_then(|resolver| resolver.public_url(key)))
    }

    /// Drop the entry for `key`; a missing entry is not an error
    pub fn invalidate(&self, key: &str) -> StoreResult<()> {
        let key = checked_key(key)?;
        self.backend
            .delete(key)
            .map_err(|e| StoreError::backend(key, e))?;
        debug!(key = %key, "Invalidated generated asset");
        Ok(())
    }

    fn has(&self, key: &str) -> StoreResult<bool> {
        self.backend
            .exists(key)
            .map_err(|e| StoreError::backend(key, e))
    }

    fn produce<P>(&self, key: &str, producer: P) -> StoreResult<Vec<u8>>
    where
        P: FnOnce() -> anyhow::Result<Vec<u8>>,
    {
        let data = producer().map_err(|source| StoreError::Generation {
            key: key.to_string(),
            source,
        })?;

        self.backend
            .put(key, &data)
            .map_err(|e| StoreError::backend(key, e))?;

        info!(key = %key, size = data.len(), "Generated asset stored");
        Ok(data)
    }
}

fn checked_key(key: &str) -> StoreResult<&str> {
    let key = key.trim();
    validate_key(key).map_err(|e| match e {
        StorageError::InvalidKey(msg) => StoreError::InvalidInput(msg),
        other => StoreError::Storage(other),
    })?;
    Ok(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use assetstore_storage::mock::MockBackend;
    use std::cell::Cell;

    fn cache() -> (MockBackend, GeneratedAssetCache) {
        let backend = MockBackend::new();
        (backend.clone(), GeneratedAssetCache::new(Arc::new(backend)))
    }

    #[test]
    fn producer_runs_once() {
        let (backend, cache) = cache();
        let calls = Cell::new(0);
        let produce = || -> anyhow::Result<Vec<u8>> {
            calls.set(calls.get() + 1);
            Ok(b"<p>fragment</p>".to_vec())
        };

        let first = cache.get_or_create("fragments/nav.html", Some(produce)).unwrap();
        let second = cache.get_or_create("fragments/nav.html", Some(produce)).unwrap();

        assert_eq!(first.as_deref(), Some(&b"<p>fragment</p>"[..]));
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(backend.write_count(), 1);
        // Keys are stored verbatim, no hash segment
        assert_eq!(backend.keys(), vec!["fragments/nav.html"]);
    }

    #[test]
    fn miss_without_producer_is_none() {
        let (backend, cache) = cache();
        assert_eq!(cache.get("nothing.bin").unwrap(), None);
        assert_eq!(
            cache
                .get_url_or_create("nothing.bin", None::<fn() -> anyhow::Result<Vec<u8>>>)
                .unwrap(),
            None
        );
        assert!(backend.is_empty());
    }

    #[test]
    fn producer_failure_is_not_cached() {
        let (backend, cache) = cache();
        let err = cache
            .get_or_create("broken.png", Some(|| Err(anyhow::anyhow!("renderer crashed"))))
            .unwrap_err();

        assert!(matches!(err, StoreError::Generation { ref key, .. } if key == "broken.png"));
        assert!(err.to_string().contains("renderer crashed"));
        assert!(backend.is_empty());
    }

    #[test]
    fn invalidate_forces_regeneration() {
        let (_backend, cache) = cache();
        cache.get_or_create("k.txt", Some(|| Ok(b"v1".to_vec()))).unwrap();
        cache.invalidate("k.txt").unwrap();
        cache.invalidate("k.txt").unwrap();

        let again = cache.get_or_create("k.txt", Some(|| Ok(b"v2".to_vec()))).unwrap();
        assert_eq!(again.as_deref(), Some(&b"v2"[..]));
    }

    #[test]
    fn urls_need_capability() {
        let backend = MockBackend::new().with_public_url("https://cdn.test/gen");
        let linked = GeneratedAssetCache::new(Arc::new(backend));
        let url = linked
            .get_url_or_create("thumbs/a-64.png", Some(|| Ok(vec![1, 2, 3])))
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn.test/gen/thumbs/a-64.png"));

        let (_plain_backend, plain) = cache();
        let url = plain
            .get_url_or_create("a.png", Some(|| Ok(vec![1])))
            .unwrap();
        assert_eq!(url, None);
    }

    #[test]
    fn empty_key_rejected() {
        let (_backend, cache) = cache();
        assert!(matches!(cache.get("  "), Err(StoreError::InvalidInput(_))));
        assert!(cache.invalidate("../x").is_err());
    }
}
