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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The (hash, filename, variant) tuple callers address assets by
///
/// The file ID handed to the backend is always recomputed from this tuple
/// and never stored alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetIdentity {
    /// Lowercase hex SHA-1 of the stored bytes
    pub hash: String,
    /// Logical path and name, without hash or variant encoding
    pub filename: String,
    /// Derived rendition token; empty for the original
    #[serde(default)]
    pub variant: String,
}

impl AssetIdentity {
    /// Identity of an original (no variant)
    pub fn new(hash: impl Into<String>, filename: impl Into<String>) -> Self {
        AssetIdentity {
            hash: hash.into(),
            filename: filename.into(),
            variant: String::new(),
        }
    }

    /// Same asset, different rendition
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    /// Whether this identity names the original rather than a variant
    pub fn is_original(&self) -> bool {
        self.variant.is_empty()
    }

    /// The original this identity is a rendition of
    pub fn original(&self) -> AssetIdentity {
        AssetIdentity::new(self.hash.clone(), self.filename.clone())
    }
}

impl fmt::Display for AssetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.hash.get(..10).unwrap_or(&self.hash);
        if self.variant.is_empty() {
            write!(f, "{} ({})", self.filename, short)
        } else {
            write!(f, "{} [{}] ({})", self.filename, self.variant, short)
        }
    }
}

/// What to do when a write targets a file ID that is already taken
///
/// Chosen per call and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Replace the existing object
    Overwrite,
    /// Write under the first free name from the rename generator
    Rename,
    /// Fail with [`StoreError::AlreadyExists`](crate::StoreError::AlreadyExists)
    Exception,
    /// Skip the write and report the existing object's hash
    #[default]
    UseExisting,
}

impl ConflictPolicy {
    /// Lowercase name as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Overwrite => "overwrite",
            ConflictPolicy::Rename => "rename",
            ConflictPolicy::Exception => "exception",
            ConflictPolicy::UseExisting => "use_existing",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "overwrite" => Ok(ConflictPolicy::Overwrite),
            "rename" => Ok(ConflictPolicy::Rename),
            "exception" | "error" => Ok(ConflictPolicy::Exception),
            "use_existing" | "existing" => Ok(ConflictPolicy::UseExisting),
            other => Err(format!(
                "unknown conflict policy '{}' (expected overwrite, rename, exception or use_existing)",
                other
            )),
        }
    }
}
