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

//! Local filesystem storage backend
//!
//! Implements the `StorageBackend` trait using the local filesystem with:
//! - Keys mapped one-to-one onto paths below the root
//! - Atomic writes using temp files and atomic rename operations
//! - Pruning of directories left empty by deletes
//!
//! # Directory Structure
//!
//! A key is used verbatim as a relative path:
//! ```text
//! root/
//!   reports/
//!     aaf4c61ddc/
//!       q1.txt
//!       q1__thumb.txt
//! ```
//!
//! Dot-files and dot-directories (`.htaccess`, `.protected/`, in-flight temp
//! files) are invisible to [`StorageBackend::list_objects`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use assetstore_storage::{StorageBackend, local::LocalBackend};
//!
//! fn main() -> anyhow::Result<()> {
//!     let storage = LocalBackend::new("public/assets")?;
//!
//!     storage.put("reports/aaf4c61ddc/q1.txt", b"hello")?;
//!     let data = storage.get("reports/aaf4c61ddc/q1.txt")?;
//!     assert_eq!(data, b"hello");
//!
//!     storage.delete("reports/aaf4c61ddc/q1.txt")?;
//!     Ok(())
//! }
//! ```

use crate::error::{validate_key, StorageError};
use crate::mime::guess_mime_type;
use crate::{ObjectMetadata, StorageBackend};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Local filesystem storage backend
///
/// # Thread Safety
///
/// This implementation is `Send + Sync`. Individual writes are atomic
/// (temp file + rename); sequences of calls are not.
#[derive(Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local filesystem backend at the given root path
    ///
    /// Creates the root directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Fails if the root path exists but is not a directory, or cannot be
    /// created.
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root)?;
        } else if !root.is_dir() {
            return Err(anyhow::anyhow!(
                "path exists but is not a directory: {}",
                root.display()
            ));
        }

        Ok(LocalBackend { root })
    }

    /// Get the root path for this backend
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the object stored under `key`
    pub fn object_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        validate_key(key)?;
        Ok(self
            .root
            .join(key.replace('\\', "/").trim_start_matches("./")))
    }

    /// Directory a prefix listing starts from: the prefix up to its last `/`
    ///
    /// `None` when that directory is hidden or escapes the root, since a
    /// full walk would never descend into it either.
    fn list_start(&self, prefix: &str) -> Option<PathBuf> {
        let prefix = prefix.replace('\\', "/");
        let dir = prefix.rfind('/').map_or("", |pos| &prefix[..pos]);
        let mut start = self.root.clone();
        for segment in dir.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment.starts_with('.') {
                return None;
            }
            start.push(segment);
        }
        Some(start)
    }

    fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Write to a uniquely named sibling temp file, then rename into place.
    /// The temp file is removed on every error path when it drops.
    fn write_atomic<F>(&self, path: &Path, fill: F) -> anyhow::Result<u64>
    where
        F: FnOnce(&mut fs::File) -> io::Result<u64>,
    {
        Self::ensure_parent_dir(path)?;
        let parent = path.parent().unwrap_or(&self.root);

        let mut temp = NamedTempFile::new_in(parent)?;
        let written = fill(temp.as_file_mut())?;
        temp.as_file_mut().flush()?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        Ok(written)
    }

    /// Remove directories emptied by a delete, stopping at the root
    fn prune_empty_parents(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.root.as_path() || !dir.starts_with(&self.root) {
                break;
            }
            // remove_dir refuses non-empty directories, which ends the walk
            if fs::remove_dir(dir).is_err() {
                break;
            }
            current = dir.parent();
        }
    }

    fn classify_io(err: io::Error, key: &str) -> anyhow::Error {
        match err.kind() {
            io::ErrorKind::NotFound => StorageError::not_found(key).into(),
            io::ErrorKind::PermissionDenied => {
                StorageError::permission_denied(format!("{}: {}", key, err)).into()
            }
            _ => err.into(),
        }
    }
}

impl fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBackend")
            .field("root", &self.root)
            .finish()
    }
}

impl StorageBackend for LocalBackend {
    fn exists(&self, key: &str) -> anyhow::Result<bool> {
        let path = self.object_path(key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.object_path(key)?;
        fs::read(&path).map_err(|e| Self::classify_io(e, key))
    }

    fn get_stream(&self, key: &str) -> anyhow::Result<Box<dyn Read + Send>> {
        let path = self.object_path(key)?;
        let file = fs::File::open(&path).map_err(|e| Self::classify_io(e, key))?;
        Ok(Box::new(io::BufReader::new(file)))
    }

    fn put(&self, key: &str, data: &[u8]) -> anyhow::Result<()> {
        let path = self.object_path(key)?;
        self.write_atomic(&path, |file| {
            file.write_all(data)?;
            Ok(data.len() as u64)
        })?;
        tracing::trace!(key = %key, size = data.len(), "Wrote object");
        Ok(())
    }

    fn put_stream(&self, key: &str, reader: &mut dyn Read) -> anyhow::Result<u64> {
        let path = self.object_path(key)?;
        let written = self.write_atomic(&path, |file| io::copy(reader, file))?;
        tracing::trace!(key = %key, size = written, "Streamed object");
        Ok(written)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.object_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                self.prune_empty_parents(&path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn metadata(&self, key: &str) -> anyhow::Result<ObjectMetadata> {
        let path = self.object_path(key)?;
        let meta = fs::metadata(&path).map_err(|e| Self::classify_io(e, key))?;
        if !meta.is_file() {
            return Err(StorageError::not_found(key).into());
        }

        Ok(ObjectMetadata {
            size: meta.len(),
            mime_type: guess_mime_type(key).map(str::to_string),
            modified: DateTime::<Utc>::from(meta.modified()?),
        })
    }

    fn list_objects(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let mut results = Vec::new();
        let mut work_queue = match self.list_start(prefix) {
            Some(start) => vec![start],
            None => return Ok(results),
        };

        while let Some(current) = work_queue.pop() {
            let entries = match fs::read_dir(&current) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            for entry in entries {
                let entry = entry?;
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }

                let path = entry.path();
                if entry.file_type()?.is_dir() {
                    work_queue.push(path);
                    continue;
                }

                if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    if key.starts_with(prefix) {
                        results.push(key);
                    }
                }
            }
        }

        results.sort();
        Ok(results)
    }
}
