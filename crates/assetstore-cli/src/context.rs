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


//! Configuration loading and store construction shared by commands

use anyhow::{Context, Result};
use assetstore_config::{Config, ConfigLoader, Visibility};
use assetstore_core::{adapter, AssetIdentity, AssetStore, GeneratedAssetCache};
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Load `path` (or defaults) with `ASSETSTORE_*` overrides applied
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = ConfigLoader::new().load_or_default(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to build default configuration".to_string(),
    })?;
    debug!(base_path = %config.app.base_path.display(), "Configuration ready");
    Ok(config)
}

/// clap value parser for `--visibility`
pub fn parse_visibility(s: &str) -> Result<Visibility, String> {
    Visibility::parse(s).ok_or_else(|| format!("unknown visibility '{}', expected public or protected", s))
}

/// Store and adapter opened for one command
pub struct StoreContext {
    /// Store over the selected adapter
    pub store: AssetStore,
}

impl StoreContext {
    /// Open the adapter for `visibility`
    pub fn open(config: &Config, visibility: Visibility) -> Result<Self> {
        let backend = adapter::open_adapter(config, visibility)
            .with_context(|| format!("Failed to open the {:?} adapter", visibility))?;
        Ok(StoreContext {
            store: AssetStore::from_config(backend, &config.store),
        })
    }

    /// Generated asset cache over the same adapter
    pub fn cache(&self) -> GeneratedAssetCache {
        GeneratedAssetCache::new(Arc::clone(self.store.backend()))
    }
}

/// `<hash> <filename> [--variant V]` addressing one stored asset
#[derive(Args, Debug)]
pub struct AssetArgs {
    /// SHA-1 hash of the asset
    pub hash: String,

    /// Logical filename, e.g. reports/q1.txt
    pub filename: String,

    /// Variant token (omit for the original)
    #[arg(long)]
    pub variant: Option<String>,
}

impl AssetArgs {
    /// Identity these arguments name
    pub fn identity(&self) -> AssetIdentity {
        let identity = AssetIdentity::new(self.hash.trim().to_ascii_lowercase(), self.filename.as_str());
        match &self.variant {
            Some(variant) => identity.with_variant(variant.as_str()),
            None => identity,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn visibility_values() {
        assert_eq!(parse_visibility("protected").unwrap(), Visibility::Protected);
        assert!(parse_visibility("secret").is_err());
    }

    #[test]
    fn asset_args_identity() {
        let args = AssetArgs {
            hash: " AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D".to_string(),
            filename: "a/b.png".to_string(),
            variant: Some("thumb".to_string()),
        };
        let identity = args.identity();
        assert_eq!(identity.hash, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
        assert_eq!(identity.variant, "thumb");
    }
}
