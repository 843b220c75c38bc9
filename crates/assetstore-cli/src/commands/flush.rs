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


//! `flush`: provision server declaration files

use crate::output;
use anyhow::{Context, Result};
use assetstore_config::{Config, Visibility};
use assetstore_core::adapter::declaration::Provisioned;
use assetstore_core::{ProtectedAdapter, PublicAdapter};
use clap::Parser;
use std::path::Path;

/// (Re)write the access-control file for the configured server platform
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    # Write missing declaration files for both roots
    assetstore flush --all

    # Replace a hand-edited .htaccess in the protected root
    assetstore --visibility protected flush --force")]
pub struct FlushCmd {
    /// Overwrite an existing declaration file
    #[arg(long)]
    pub force: bool,

    /// Flush both the public and the protected root
    #[arg(long)]
    pub all: bool,
}

impl FlushCmd {
    /// Run the command
    pub fn execute(&self, config: &Config, visibility: Visibility) -> Result<()> {
        if self.all || visibility == Visibility::Public {
            let adapter = PublicAdapter::configured(config).context("Failed to open the public adapter")?;
            report(adapter.root(), adapter.flush(self.force)?);
        }
        if self.all || visibility == Visibility::Protected {
            let adapter =
                ProtectedAdapter::configured(config).context("Failed to open the protected adapter")?;
            report(adapter.root(), adapter.flush(self.force)?);
        }
        Ok(())
    }
}

fn report(root: &Path, outcome: Provisioned) {
    let root = root.display();
    match outcome {
        Provisioned::Written => output::success(&format!("Wrote declaration file in {}", root)),
        Provisioned::AlreadyPresent => {
            output::success(&format!("Declaration file already present in {} (use --force to replace)", root))
        }
        Provisioned::NoPlatform => output::warning("No recognized server.platform configured, nothing to write"),
        Provisioned::Failed => output::warning(&format!("Could not write declaration file in {}", root)),
    }
}
