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


//! `store`: hash a file and persist it under its file ID

use crate::context::StoreContext;
use crate::output;
use anyhow::{bail, Context, Result};
use assetstore_config::{Config, Visibility};
use assetstore_core::{AssetIdentity, AssetStore, ConflictPolicy};
use clap::Parser;
use serde_json::json;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Store a file or standard input
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    # Store a file under its own name
    assetstore store ./q1.txt

    # Store under a logical path, renaming on conflict
    assetstore store ./scan.pdf --name reports/2025/q1.pdf --policy rename

    # Store piped data
    curl -s https://example.com/logo.png | assetstore store --stdin --name brand/logo.png")]
pub struct StoreCmd {
    /// File to store
    #[arg(value_name = "PATH", required_unless_present = "stdin", conflicts_with = "stdin")]
    pub path: Option<PathBuf>,

    /// Logical filename (defaults to the file's name)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// What to do if the file ID is taken: use-existing, overwrite, rename, exception
    #[arg(long, value_name = "POLICY", default_value = "use-existing")]
    pub policy: ConflictPolicy,

    /// Read the content from standard input (requires --name)
    #[arg(long)]
    pub stdin: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl StoreCmd {
    /// Run the command
    pub fn execute(&self, config: &Config, visibility: Visibility) -> Result<()> {
        let ctx = StoreContext::open(config, visibility)?;
        let identity = self.store(&ctx.store)?;
        report(&ctx.store, &identity, self.json)
    }

    fn store(&self, store: &AssetStore) -> Result<AssetIdentity> {
        debug!(policy = ?self.policy, stdin = self.stdin, "Storing asset");
        if self.stdin {
            let Some(name) = self.name.as_deref() else {
                bail!("--stdin requires --name");
            };
            let mut input = io::stdin().lock();
            return store
                .store_from_stream(&mut input, name, self.policy)
                .context("Failed to store standard input");
        }

        let Some(path) = self.path.as_deref() else {
            bail!("nothing to store: give a PATH or --stdin");
        };
        store
            .store_from_local_path(path, self.name.as_deref(), self.policy)
            .with_context(|| format!("Failed to store {}", path.display()))
    }
}

fn report(store: &AssetStore, identity: &AssetIdentity, as_json: bool) -> Result<()> {
    let file_id = store.file_id(identity)?;
    let url = store.url_for(identity)?;

    if as_json {
        return output::json(&json!({
            "hash": identity.hash,
            "filename": identity.filename,
            "variant": identity.variant,
            "file_id": file_id,
            "url": url,
        }));
    }

    output::success(&format!("Stored {}", identity.filename));
    output::detail("Hash", &identity.hash);
    output::detail("File ID", &file_id);
    if let Some(url) = url {
        output::detail("URL", &url);
    }
    Ok(())
}
