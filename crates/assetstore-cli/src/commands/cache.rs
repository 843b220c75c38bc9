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


//! `cache`: the generated asset cache
//!
//! Keys are stored verbatim, without hash or variant encoding.

use crate::context::StoreContext;
use crate::output;
use anyhow::{Context, Result};
use assetstore_config::{Config, Visibility};
use clap::Subcommand;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Generated asset cache operations
#[derive(Subcommand, Debug)]
pub enum CacheCmd {
    /// Write a cached entry to standard output
    Get {
        /// Cache key, e.g. thumbnails/photo-120x80.png
        key: String,
    },

    /// Fill an entry from a file or stdin, unless it is already cached
    Put {
        /// Cache key
        key: String,

        /// Content file (reads stdin when omitted)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Replace an existing entry
        #[arg(long)]
        force: bool,
    },

    /// Print the URL of a cached entry
    Url {
        /// Cache key
        key: String,
    },

    /// Invalidate an entry
    Rm {
        /// Cache key
        key: String,
    },
}

impl CacheCmd {
    /// Run the command
    pub fn execute(&self, config: &Config, visibility: Visibility) -> Result<()> {
        let ctx = StoreContext::open(config, visibility)?;
        let cache = ctx.cache();

        match self {
            CacheCmd::Get { key } => {
                let data = cache
                    .get(key)?
                    .with_context(|| format!("No cached entry for {}", key))?;
                let mut out = io::stdout().lock();
                out.write_all(&data)?;
                out.flush()?;
            }
            CacheCmd::Put { key, path, force } => {
                if *force {
                    cache.invalidate(key)?;
                }
                let mut produced = false;
                let data = cache
                    .get_or_create(
                        key,
                        Some(|| -> anyhow::Result<Vec<u8>> {
                            produced = true;
                            read_source(path.as_ref())
                        }),
                    )?
                    .unwrap_or_default();

                if produced {
                    output::success(&format!("Cached {} ({} bytes)", key, data.len()));
                } else {
                    output::success(&format!("{} already cached", key));
                }
            }
            CacheCmd::Url { key } => {
                let url = cache
                    .get_url_or_create(key, None::<fn() -> anyhow::Result<Vec<u8>>>)?
                    .with_context(|| format!("No URL for {}: entry missing or root not web-servable", key))?;
                println!("{}", url);
            }
            CacheCmd::Rm { key } => {
                cache.invalidate(key)?;
                output::success(&format!("Invalidated {}", key));
            }
        }
        Ok(())
    }
}

fn read_source(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}
