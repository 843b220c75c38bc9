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


//! Commands addressing one stored asset by `(hash, filename, variant)`

use crate::context::{AssetArgs, StoreContext};
use crate::output;
use anyhow::{Context, Result};
use assetstore_config::{Config, Visibility};
use clap::Parser;
use serde_json::json;
use std::io::{self, Write};

/// Write an asset's bytes to standard output
#[derive(Parser, Debug)]
pub struct CatCmd {
    #[command(flatten)]
    pub asset: AssetArgs,
}

impl CatCmd {
    /// Run the command
    pub fn execute(&self, config: &Config, visibility: Visibility) -> Result<()> {
        let ctx = StoreContext::open(config, visibility)?;
        let identity = self.asset.identity();
        let mut reader = ctx
            .store
            .read_as_stream(&identity)
            .with_context(|| format!("Failed to read {}", identity))?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        io::copy(&mut reader, &mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// Print the URL of an asset
#[derive(Parser, Debug)]
pub struct UrlCmd {
    #[command(flatten)]
    pub asset: AssetArgs,
}

impl UrlCmd {
    /// Run the command
    pub fn execute(&self, config: &Config, visibility: Visibility) -> Result<()> {
        let ctx = StoreContext::open(config, visibility)?;
        let identity = self.asset.identity();
        match ctx.store.url_for(&identity)? {
            Some(url) => {
                println!("{}", url);
                Ok(())
            }
            None => anyhow::bail!("no URL available for {}: the storage root is not web-servable", identity),
        }
    }
}

/// Show metadata, URL and variants of an asset
#[derive(Parser, Debug)]
pub struct InfoCmd {
    #[command(flatten)]
    pub asset: AssetArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl InfoCmd {
    /// Run the command
    pub fn execute(&self, config: &Config, visibility: Visibility) -> Result<()> {
        let ctx = StoreContext::open(config, visibility)?;
        let store = &ctx.store;
        let identity = self.asset.identity();

        let file_id = store.file_id(&identity)?;
        let meta = store
            .metadata_for(&identity)
            .with_context(|| format!("Failed to read metadata for {}", identity))?;
        let url = store.url_for(&identity)?;
        let variants = if identity.is_original() {
            store.variants_of(&identity)?
        } else {
            Vec::new()
        };

        if self.json {
            return output::json(&json!({
                "hash": identity.hash,
                "filename": identity.filename,
                "variant": identity.variant,
                "file_id": file_id,
                "size": meta.size,
                "mime_type": meta.mime_type,
                "modified": meta.modified.to_rfc3339(),
                "url": url,
                "variants": variants,
            }));
        }

        println!("{}", identity);
        output::detail("File ID", &file_id);
        output::detail("Size", &format!("{} bytes", meta.size));
        output::detail("MIME type", meta.mime_type.as_deref().unwrap_or("unknown"));
        output::detail("Modified", &meta.modified.to_rfc3339());
        if let Some(url) = url {
            output::detail("URL", &url);
        }
        if !variants.is_empty() {
            output::detail("Variants", &variants.join(", "));
        }
        Ok(())
    }
}

/// Delete an asset
#[derive(Parser, Debug)]
pub struct RmCmd {
    #[command(flatten)]
    pub asset: AssetArgs,
}

impl RmCmd {
    /// Run the command
    pub fn execute(&self, config: &Config, visibility: Visibility) -> Result<()> {
        let ctx = StoreContext::open(config, visibility)?;
        let identity = self.asset.identity();
        let variants = if identity.is_original() {
            ctx.store.variants_of(&identity)?.len()
        } else {
            0
        };

        ctx.store
            .delete(&identity)
            .with_context(|| format!("Failed to delete {}", identity))?;

        if variants > 0 {
            output::success(&format!("Deleted {} and {} variant(s)", identity, variants));
        } else {
            output::success(&format!("Deleted {}", identity));
        }
        Ok(())
    }
}
