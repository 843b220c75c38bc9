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


//! Shared helpers for CLI tests

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// SHA-1 of `hello`
pub const HELLO_HASH: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";

/// A throwaway site directory with an isolated environment
pub struct Site {
    pub dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        Site {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` under the default public root
    pub fn public_asset(&self, rel: &str) -> PathBuf {
        self.path().join("public/assets").join(rel)
    }

    /// Write `content` to `name` inside the site and return its path
    pub fn file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write fixture");
        path
    }

    /// Write a config file for this site and return its path
    pub fn config(&self, extra: &str) -> PathBuf {
        let toml = format!(
            "[app]\nbase_path = {:?}\n\n{}",
            self.path().display().to_string(),
            extra
        );
        self.file("assetstore.toml", toml.as_bytes())
    }

    /// `assetstore` rooted at this site, with colors off
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("assetstore").expect("binary built");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env("ASSETSTORE_BASE_PATH", self.path())
            .args(["--color", "never", "-q"]);
        cmd
    }
}
