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

//! Content-addressable asset storage
//!
//! Uploaded and generated binaries are stored under deterministic file IDs
//! derived from `(hash, filename, variant)`:
//!
//! - [`codec`]: file ID encoding and decoding
//! - [`AssetStore`]: hashing, conflict resolution and reads over a
//!   [`StorageBackend`](assetstore_storage::StorageBackend)
//! - [`adapter`]: public and protected local roots with URL derivation and
//!   server declaration files
//! - [`GeneratedAssetCache`]: check-or-create cache for derived content
//!
//! # Example
//!
//! ```no_run
//! use assetstore_config::ConfigLoader;
//! use assetstore_core::{adapter, AssetStore, ConflictPolicy};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load_or_default(None)?;
//!     let backend = adapter::open_adapter(&config, config.store.visibility)?;
//!     let store = AssetStore::from_config(backend, &config.store);
//!
//!     let id = store.store_from_bytes(b"hello", "reports/q1.txt", ConflictPolicy::default())?;
//!     println!("{} -> {:?}", id, store.url_for(&id)?);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod codec;
pub mod error;
pub mod generated;
pub mod hash;
pub mod identity;
pub mod naming;
pub mod store;
pub mod strategy;

pub use adapter::{ProtectedAdapter, PublicAdapter};
pub use codec::{parse_file_id, FileIdCodec, ParsedFileId};
pub use error::{StoreError, StoreResult};
pub use generated::GeneratedAssetCache;
pub use identity::{AssetIdentity, ConflictPolicy};
pub use naming::{RenameCandidateGenerator, SuffixRenameGenerator};
pub use store::AssetStore;
pub use strategy::{BytesWrite, PathWrite, StreamWrite, WriteStrategy};
