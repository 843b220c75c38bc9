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

use super::declaration::{provision, Provisioned};
use super::{
    check_reserved_key, default_public_root, delegate_storage_backend, encode_url_path, join_url,
    resolve_root,
};
use crate::error::StoreResult;
use assetstore_config::{Config, ServerDeclaration};
use assetstore_storage::{LocalBackend, StorageError, UrlResolvable};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directly servable asset directory
///
/// A URL is available only when the root lies inside the web root; assets
/// stored anywhere else cannot be linked to.
#[derive(Debug, Clone)]
pub struct PublicAdapter {
    backend: LocalBackend,
    url_base: Option<String>,
    declaration: Option<ServerDeclaration>,
}

impl PublicAdapter {
    /// Adapter rooted at `root`, served from `web_root` under `base_url`
    ///
    /// The root is created if missing.
    pub fn new(root: impl AsRef<Path>, web_root: &Path, base_url: &str) -> StoreResult<Self> {
        let backend = LocalBackend::new(root.as_ref()).map_err(StorageError::from)?;
        let url_base = relative_url_path(backend.root(), web_root).map(|rel| join_url(base_url, &rel));

        debug!(root = %backend.root().display(), url_base = ?url_base, "Opened public adapter");
        Ok(PublicAdapter {
            backend,
            url_base,
            declaration: None,
        })
    }

    /// Adapter from the `[app]`, `[public]` and `[server]` tables
    ///
    /// Provisions the platform declaration file on a best-effort basis.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let adapter = Self::configured(config)?;
        adapter.flush(false)?;
        Ok(adapter)
    }

    /// Like [`Self::from_config`], without touching the declaration file
    pub fn configured(config: &Config) -> StoreResult<Self> {
        let root = resolve_root(
            config.public.root.as_deref(),
            &config.app.base_path,
            &config.app.web_root(),
            default_public_root(config),
        );
        Ok(Self::new(root, &config.app.web_root(), &config.app.base_url)?
            .with_declaration(config.server.declaration().cloned()))
    }

    /// Declaration file to provision (and reserve) at the root
    pub fn with_declaration(mut self, declaration: Option<ServerDeclaration>) -> Self {
        self.declaration = declaration;
        self
    }

    /// Absolute storage root
    pub fn root(&self) -> &Path {
        self.backend.root()
    }

    /// URL prefix for this root, if it is servable
    pub fn url_base(&self) -> Option<&str> {
        self.url_base.as_deref()
    }

    /// (Re)write the server declaration file
    pub fn flush(&self, force: bool) -> StoreResult<Provisioned> {
        provision(self.root(), self.declaration.as_ref(), false, force)
    }

    fn declaration_file_name(&self) -> Option<&str> {
        self.declaration.as_ref().map(|d| d.file_name.as_str())
    }

    fn check_key(&self, key: &str) -> Result<(), StorageError> {
        check_reserved_key(key, self.declaration_file_name())
    }
}

impl UrlResolvable for PublicAdapter {
    fn public_url(&self, key: &str) -> Option<String> {
        self.url_base
            .as_deref()
            .map(|base| join_url(base, &encode_url_path(key)))
    }
}

delegate_storage_backend!(PublicAdapter);

/// `root` relative to `web_root` as a `/`-joined path, if it is inside it
fn relative_url_path(root: &Path, web_root: &Path) -> Option<String> {
    let root: PathBuf = root.canonicalize().ok()?;
    let web_root = web_root.canonicalize().ok()?;
    let relative = root.strip_prefix(&web_root).ok()?;

    Some(
        relative
            .components()
            .map(|c| urlencoding::encode(&c.as_os_str().to_string_lossy()).into_owned())
            .collect::<Vec<_>>()
            .join("/"),
    )
}
