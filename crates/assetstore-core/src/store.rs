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

//! Asset store orchestration
//!
//! Every `store_*` call follows the same path:
//!
//! 1. clean the filename
//! 2. hash the exact bytes that will be written
//! 3. encode the candidate file ID
//! 4. resolve conflicts against [`StorageBackend::exists`]
//! 5. hand the winning file ID to a [`WriteStrategy`]
//!
//! # Concurrency
//!
//! All calls block on the caller's thread. The existence check and the write
//! in step 4 and 5 are separate backend calls, so two writers racing for the
//! same file ID under `UseExisting` or `Exception` can both see it free.
//! Backends offer no compare-and-swap primitive, so the race is not guarded
//! here.
//!
//! # Reserved names
//!
//! Adapters refuse keys with a hidden directory segment (`.well-known/x.txt`)
//! and the server declaration file name. Storing under such a filename fails
//! with [`StoreError::InvalidInput`].
//!
//! # Example
//!
//! ```
//! use assetstore_core::{AssetStore, ConflictPolicy};
//! use assetstore_storage::mock::MockBackend;
//! use std::sync::Arc;
//!
//! let store = AssetStore::new(Arc::new(MockBackend::new()));
//! let id = store
//!     .store_from_bytes(b"hello", "reports/q1.txt", ConflictPolicy::default())
//!     .unwrap();
//! assert_eq!(id.hash, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
//! assert_eq!(store.file_id(&id).unwrap(), "reports/aaf4c61ddc/q1.txt");
//!
//! let renamed = store
//!     .store_from_bytes(b"hello", "reports/q1.txt", ConflictPolicy::Rename)
//!     .unwrap();
//! assert_eq!(renamed.filename, "reports/q1-1.txt");
//! ```

use crate::codec::{clean_filename, clean_variant, parse_file_id, FileIdCodec, ParsedFileId};
use crate::error::{StoreError, StoreResult};
use crate::hash::{hash_bytes, hash_file, hash_reader};
use crate::identity::{AssetIdentity, ConflictPolicy};
use crate::naming::{RenameCandidateGenerator, SuffixRenameGenerator};
use crate::strategy::{BytesWrite, PathWrite, StreamWrite, WriteStrategy};
use assetstore_config::StoreConfig;
use assetstore_storage::{ObjectMetadata, StorageBackend};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Content-addressable asset store over a backend port
#[derive(Debug, Clone)]
pub struct AssetStore {
    backend: Arc<dyn StorageBackend>,
    codec: FileIdCodec,
    renamer: Arc<dyn RenameCandidateGenerator>,
    temp_dir: Option<PathBuf>,
}

impl AssetStore {
    /// Store with hashed file IDs, the default rename generator and the
    /// system temp directory
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        AssetStore {
            backend,
            codec: FileIdCodec::hashed(),
            renamer: Arc::new(SuffixRenameGenerator::default()),
            temp_dir: None,
        }
    }

    /// Store configured from the `[store]` table
    pub fn from_config(backend: Arc<dyn StorageBackend>, config: &StoreConfig) -> Self {
        AssetStore {
            backend,
            codec: FileIdCodec::new(config.legacy_filenames),
            renamer: Arc::new(SuffixRenameGenerator::new(config.max_rename_attempts)),
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Use a different rename candidate generator
    pub fn with_rename_generator(mut self, renamer: Arc<dyn RenameCandidateGenerator>) -> Self {
        self.renamer = renamer;
        self
    }

    /// Switch between hashed and legacy file IDs
    pub fn with_legacy_filenames(mut self, legacy: bool) -> Self {
        self.codec = FileIdCodec::new(legacy);
        self
    }

    /// Spool non-seekable streams into `dir` instead of the system temp dir
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Backend this store writes through
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Codec used to build file IDs
    pub fn codec(&self) -> FileIdCodec {
        self.codec
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Store an in-memory buffer
    pub fn store_from_bytes(
        &self,
        data: &[u8],
        filename: &str,
        policy: ConflictPolicy,
    ) -> StoreResult<AssetIdentity> {
        let hash = hash_bytes(data);
        self.write_with_strategy(&mut BytesWrite::new(data), filename, &hash, policy)
    }

    /// Store a seekable stream from its current position
    ///
    /// The stream is hashed, rewound and written. It stays open and owned by
    /// the caller.
    pub fn store_from_seekable_stream<R: Read + Seek>(
        &self,
        reader: &mut R,
        filename: &str,
        policy: ConflictPolicy,
    ) -> StoreResult<AssetIdentity> {
        let start = reader.stream_position()?;
        let hash = hash_reader(reader)?;
        reader.seek(SeekFrom::Start(start))?;
        self.write_with_strategy(&mut StreamWrite::new(reader, start), filename, &hash, policy)
    }

    /// Store a stream of unknown size that cannot be rewound
    ///
    /// The stream is spooled to a temporary file, which is then stored like
    /// a local path. The temporary file is removed on every exit path; a
    /// failure to remove it is logged and never replaces the primary result.
    pub fn store_from_stream<R: Read>(
        &self,
        reader: &mut R,
        filename: &str,
        policy: ConflictPolicy,
    ) -> StoreResult<AssetIdentity> {
        let mut spool = match &self.temp_dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        let spool_path = spool.path().to_path_buf();

        let result = io::copy(reader, &mut spool)
            .and_then(|_| spool.flush())
            .map_err(StoreError::from)
            .and_then(|()| self.store_from_local_path(&spool_path, Some(filename), policy));

        if let Err(e) = spool.close() {
            warn!(path = %spool_path.display(), error = %e, "Failed to remove spool file");
        }

        result
    }

    /// Store a local file
    ///
    /// `filename` defaults to the file's own name.
    pub fn store_from_local_path(
        &self,
        path: &Path,
        filename: Option<&str>,
        policy: ConflictPolicy,
    ) -> StoreResult<AssetIdentity> {
        if !path.exists() {
            return Err(StoreError::SourceNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(StoreError::invalid_input(format!(
                "not a regular file: {}",
                path.display()
            )));
        }

        let filename = match filename {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    StoreError::invalid_input(format!(
                        "cannot derive a filename from {}",
                        path.display()
                    ))
                })?,
        };

        let hash = hash_file(path)?;
        self.write_with_strategy(&mut PathWrite::new(path), &filename, &hash, policy)
    }

    /// Store a derived rendition of `original`
    ///
    /// Variants share the original's hash and filename and always overwrite
    /// an earlier rendition with the same token.
    pub fn store_variant(
        &self,
        data: &[u8],
        original: &AssetIdentity,
        variant: &str,
    ) -> StoreResult<AssetIdentity> {
        let variant = clean_variant(variant)?;
        if variant.is_empty() {
            return Err(StoreError::invalid_input("variant must not be empty"));
        }

        let identity = original.original().with_variant(variant);
        let file_id = self.file_id(&identity)?;

        BytesWrite::new(data)
            .write(self.backend.as_ref(), &file_id)
            .map_err(|e| StoreError::backend(&file_id, e))?;

        info!(file_id = %file_id, size = data.len(), "Stored variant");
        Ok(identity)
    }

    /// Resolve conflicts for `(hash, filename)` and write through `strategy`
    ///
    /// `hash` must be the hash of the bytes `strategy` will write. At most one
    /// physical write happens; none when `UseExisting` finds the target taken.
    pub fn write_with_strategy(
        &self,
        strategy: &mut dyn WriteStrategy,
        filename: &str,
        hash: &str,
        policy: ConflictPolicy,
    ) -> StoreResult<AssetIdentity> {
        let filename = clean_filename(filename);
        if filename.is_empty() {
            return Err(StoreError::invalid_input("filename is empty after cleaning"));
        }

        let file_id = self.codec.encode(hash, &filename, "")?;
        let taken = self.exists_raw(&file_id)?;

        if taken {
            match policy {
                ConflictPolicy::Overwrite => {}
                ConflictPolicy::UseExisting => {
                    let existing = self.hash_existing(&file_id)?;
                    debug!(file_id = %file_id, hash = %existing, "Reusing existing asset");
                    return Ok(AssetIdentity::new(existing, filename));
                }
                ConflictPolicy::Exception => return Err(StoreError::AlreadyExists { file_id }),
                ConflictPolicy::Rename => return self.write_renamed(strategy, &file_id, hash),
            }
        }

        self.physical_write(strategy, &file_id)?;
        info!(file_id = %file_id, policy = %policy, replaced = taken, "Stored asset");
        Ok(AssetIdentity::new(hash, filename))
    }

    fn write_renamed(
        &self,
        strategy: &mut dyn WriteStrategy,
        file_id: &str,
        hash: &str,
    ) -> StoreResult<AssetIdentity> {
        let mut attempts = 0;
        for candidate in self.renamer.candidates(file_id) {
            attempts += 1;
            if self.exists_raw(&candidate)? {
                continue;
            }

            self.physical_write(strategy, &candidate)?;
            let renamed = parse_file_id(&candidate).filename;
            info!(file_id = %candidate, requested = %file_id, attempts, "Stored asset under new name");
            return Ok(AssetIdentity::new(hash, renamed));
        }

        Err(StoreError::RenameExhausted {
            file_id: file_id.to_string(),
            attempts,
        })
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Read a whole asset into memory
    pub fn read_as_bytes(&self, identity: &AssetIdentity) -> StoreResult<Vec<u8>> {
        let file_id = self.file_id(identity)?;
        self.backend
            .get(&file_id)
            .map_err(|e| StoreError::backend(file_id, e))
    }

    /// Open an asset for streaming; the reader belongs to the caller
    pub fn read_as_stream(&self, identity: &AssetIdentity) -> StoreResult<Box<dyn Read + Send>> {
        let file_id = self.file_id(identity)?;
        self.backend
            .get_stream(&file_id)
            .map_err(|e| StoreError::backend(file_id, e))
    }

    /// Direct URL for an asset, when the backend can produce one
    pub fn url_for(&self, identity: &AssetIdentity) -> StoreResult<Option<String>> {
        let file_id = self.file_id(identity)?;
        Ok(self
            .backend
            .as_url_resolvable()
            .and_then(|resolver| resolver.public_url(&file_id)))
    }

    /// Size, MIME type and modification time
    pub fn metadata_for(&self, identity: &AssetIdentity) -> StoreResult<ObjectMetadata> {
        let file_id = self.file_id(identity)?;
        self.backend
            .metadata(&file_id)
            .map_err(|e| StoreError::backend(file_id, e))
    }

    /// Whether the asset is stored
    pub fn exists(&self, identity: &AssetIdentity) -> StoreResult<bool> {
        let file_id = self.file_id(identity)?;
        self.exists_raw(&file_id)
    }

    /// Delete an asset; deleting an original also deletes its variants
    ///
    /// Deleting something that is not stored succeeds.
    pub fn delete(&self, identity: &AssetIdentity) -> StoreResult<()> {
        let file_id = self.file_id(identity)?;

        if identity.is_original() {
            for variant_id in self.variant_ids(&file_id, identity)? {
                self.delete_raw(&variant_id)?;
            }
        }

        self.delete_raw(&file_id)?;
        info!(file_id = %file_id, "Deleted asset");
        Ok(())
    }

    /// Variant tokens currently stored for an original
    pub fn variants_of(&self, original: &AssetIdentity) -> StoreResult<Vec<String>> {
        let original = original.original();
        let file_id = self.file_id(&original)?;
        Ok(self
            .variant_ids(&file_id, &original)?
            .iter()
            .map(|id| parse_file_id(id).variant)
            .collect())
    }

    // ------------------------------------------------------------------
    // Codec access
    // ------------------------------------------------------------------

    /// File ID for a tuple
    pub fn file_id(&self, identity: &AssetIdentity) -> StoreResult<String> {
        self.codec
            .encode(&identity.hash, &identity.filename, &identity.variant)
    }

    /// Filename and variant behind a file ID
    pub fn parse_file_id(&self, file_id: &str) -> ParsedFileId {
        self.codec.decode(file_id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn exists_raw(&self, file_id: &str) -> StoreResult<bool> {
        self.backend
            .exists(file_id)
            .map_err(|e| StoreError::backend(file_id, e))
    }

    fn delete_raw(&self, file_id: &str) -> StoreResult<()> {
        self.backend
            .delete(file_id)
            .map_err(|e| StoreError::backend(file_id, e))
    }

    fn physical_write(&self, strategy: &mut dyn WriteStrategy, file_id: &str) -> StoreResult<()> {
        strategy
            .write(self.backend.as_ref(), file_id)
            .map_err(|e| StoreError::backend(file_id, e))
    }

    fn hash_existing(&self, file_id: &str) -> StoreResult<String> {
        let mut reader = self
            .backend
            .get_stream(file_id)
            .map_err(|e| StoreError::backend(file_id, e))?;
        hash_reader(&mut reader).map_err(|e| StoreError::backend(file_id, e.into()))
    }

    /// Stored keys that decode to variants of `original`
    fn variant_ids(&self, file_id: &str, original: &AssetIdentity) -> StoreResult<Vec<String>> {
        // Variants share everything up to the end of the original's stem
        let base_start = file_id.rfind('/').map_or(0, |pos| pos + 1);
        let stem_len = file_id[base_start..]
            .find('.')
            .unwrap_or(file_id.len() - base_start);
        let prefix = &file_id[..base_start + stem_len];

        let filename = clean_filename(&original.filename);
        let keys = self
            .backend
            .list_objects(prefix)
            .map_err(|e| StoreError::backend(file_id, e))?;

        Ok(keys
            .into_iter()
            .filter(|key| key != file_id)
            .filter(|key| {
                let parsed = parse_file_id(key);
                !parsed.variant.is_empty()
                    && parsed.filename == filename
                    && key.rfind('/').map(|p| &key[..p]) == file_id.rfind('/').map(|p| &file_id[..p])
            })
            .collect())
    }
}
