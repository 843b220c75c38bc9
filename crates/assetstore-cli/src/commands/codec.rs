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


//! `parse` and `encode`: the file ID codec without touching storage

use crate::output;
use anyhow::Result;
use assetstore_config::Config;
use assetstore_core::{parse_file_id, FileIdCodec};
use clap::Parser;
use serde_json::json;

/// Decode a file ID
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    assetstore parse reports/aaf4c61ddc/q1__thumb.txt")]
pub struct ParseCmd {
    /// File ID as stored by the backend
    #[arg(value_name = "FILE_ID")]
    pub file_id: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl ParseCmd {
    /// Run the command
    pub fn execute(&self, _config: &Config) -> Result<()> {
        let parsed = parse_file_id(&self.file_id);

        if self.json {
            return output::json(&serde_json::to_value(&parsed)?);
        }

        output::detail("Filename", &parsed.filename);
        output::detail("Variant", if parsed.variant.is_empty() { "(original)" } else { parsed.variant.as_str() });
        output::detail("Hash prefix", parsed.hash_prefix.as_deref().unwrap_or("(none)"));
        Ok(())
    }
}

/// Encode a file ID
#[derive(Parser, Debug)]
pub struct EncodeCmd {
    /// SHA-1 hash
    pub hash: String,

    /// Logical filename
    pub filename: String,

    /// Variant token
    #[arg(long, default_value = "")]
    pub variant: String,

    /// Omit the hash directory regardless of store.legacy_filenames
    #[arg(long)]
    pub legacy: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl EncodeCmd {
    /// Run the command
    pub fn execute(&self, config: &Config) -> Result<()> {
        let codec = FileIdCodec::new(self.legacy || config.store.legacy_filenames);
        let hash = self.hash.trim().to_ascii_lowercase();
        let file_id = codec.encode(&hash, &self.filename, &self.variant)?;

        if self.json {
            return output::json(&json!({
                "file_id": file_id,
                "legacy": codec.is_legacy(),
            }));
        }

        println!("{}", file_id);
        Ok(())
    }
}
