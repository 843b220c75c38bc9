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

//! Server access-control declaration files
//!
//! The recognized platforms form a closed table supplied by configuration
//! (`[server.declarations]`). An unknown or unset platform provisions nothing.

use crate::error::{StoreError, StoreResult};
use assetstore_config::ServerDeclaration;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of a provisioning attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// The declaration file was written
    Written,
    /// A declaration file already existed and `force` was not set
    AlreadyPresent,
    /// No platform, or an unrecognized one
    NoPlatform,
    /// Best-effort write failed and was logged
    Failed,
}

/// Write the declaration file for `declaration` into `root`
///
/// Without `force`, an existing file is left alone and a write failure is
/// only logged. With `force`, the file is always rewritten and failures are
/// returned.
pub fn provision(
    root: &Path,
    declaration: Option<&ServerDeclaration>,
    protected: bool,
    force: bool,
) -> StoreResult<Provisioned> {
    let declaration = match declaration {
        Some(declaration) => declaration,
        None => {
            debug!(root = %root.display(), "No recognized server platform, skipping declaration file");
            return Ok(Provisioned::NoPlatform);
        }
    };

    let path = root.join(&declaration.file_name);
    if !force && path.exists() {
        debug!(path = %path.display(), "Declaration file already present");
        return Ok(Provisioned::AlreadyPresent);
    }

    let content = if protected {
        &declaration.protected_content
    } else {
        &declaration.public_content
    };

    match fs::write(&path, content) {
        Ok(()) => {
            info!(path = %path.display(), "Wrote server declaration file");
            Ok(Provisioned::Written)
        }
        Err(e) if force => Err(StoreError::Io(e)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not write server declaration file");
            Ok(Provisioned::Failed)
        }
    }
}
