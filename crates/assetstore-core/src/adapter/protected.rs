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
    check_reserved_key, default_protected_root, delegate_storage_backend, encode_url_path,
    join_url, resolve_root,
};
use crate::error::StoreResult;
use assetstore_config::{Config, ServerDeclaration};
use assetstore_storage::{LocalBackend, StorageError, UrlResolvable};
use std::path::Path;
use tracing::debug;

/// Access-controlled asset directory
///
/// Files are never linked to directly. Every URL points at the request
/// handler, which decides per request whether the asset may be served.
#[derive(Debug, Clone)]
pub struct ProtectedAdapter {
    backend: LocalBackend,
    handler_url: String,
    declaration: Option<ServerDeclaration>,
}

impl ProtectedAdapter {
    /// Adapter rooted at `root` whose URLs go through `base_url/handler_path`
    pub fn new(root: impl AsRef<Path>, base_url: &str, handler_path: &str) -> StoreResult<Self> {
        let backend = LocalBackend::new(root.as_ref()).map_err(StorageError::from)?;
        let handler_url = join_url(base_url, handler_path);

        debug!(root = %backend.root().display(), handler = %handler_url, "Opened protected adapter");
        Ok(ProtectedAdapter {
            backend,
            handler_url,
            declaration: None,
        })
    }

    /// Adapter from the `[app]`, `[protected]` and `[server]` tables
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
            config.protected.root.as_deref(),
            &config.app.base_path,
            &config.app.web_root(),
            default_protected_root(config),
        );
        Ok(Self::new(root, &config.app.base_url, &config.protected.handler_path)?
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

    /// URL of the access-checking request handler
    pub fn handler_url(&self) -> &str {
        &self.handler_url
    }

    /// (Re)write the deny-all declaration file
    pub fn flush(&self, force: bool) -> StoreResult<Provisioned> {
        provision(self.root(), self.declaration.as_ref(), true, force)
    }

    fn declaration_file_name(&self) -> Option<&str> {
        self.declaration.as_ref().map(|d| d.file_name.as_str())
    }

    fn check_key(&self, key: &str) -> Result<(), StorageError> {
        check_reserved_key(key, self.declaration_file_name())
    }
}

impl UrlResolvable for ProtectedAdapter {
    fn public_url(&self, key: &str) -> Option<String> {
        Some(join_url(&self.handler_url, &encode_url_path(key)))
    }
}

delegate_storage_backend!(ProtectedAdapter);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapter::PublicAdapter;
    use assetstore_storage::StorageBackend;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.app.base_path = dir.to_path_buf();
        config.server.platform = Some("apache".to_string());
        config
    }

    #[test]
    fn urls_route_through_handler() {
        let dir = TempDir::new().unwrap();
        let adapter = ProtectedAdapter::from_config(&config_in(dir.path())).unwrap();

        assert_eq!(adapter.handler_url(), "/assets");
        assert_eq!(
            adapter.public_url("reports/aaf4c61ddc/q1.txt").as_deref(),
            Some("/assets/reports/aaf4c61ddc/q1.txt")
        );
    }

    #[test]
    fn default_root_is_hidden_inside_public_root() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let public = PublicAdapter::from_config(&config).unwrap();
        let protected = ProtectedAdapter::from_config(&config).unwrap();

        assert_eq!(protected.root(), public.root().join(".protected"));

        protected.put("secret/aaf4c61ddc/plan.pdf", b"x").unwrap();
        assert!(public.list_objects("").unwrap().is_empty());

        let deny = std::fs::read_to_string(protected.root().join(".htaccess")).unwrap();
        assert!(deny.contains("Require all denied"));
    }

    #[test]
    fn parent_relative_root_leaves_web_root() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("site");
        std::fs::create_dir_all(&base).unwrap();

        let mut config = config_in(&base);
        config.app.public_dir = String::new();
        config.protected.root = Some("../private".to_string());
        config.protected.handler_path = "/secure/".to_string();

        let adapter = ProtectedAdapter::from_config(&config).unwrap();
        assert_eq!(adapter.root(), dir.path().join("private"));
        assert_eq!(adapter.public_url("a.txt").as_deref(), Some("/secure/a.txt"));
    }
}
