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

//! Configuration for AssetStore
//!
//! A [`Config`] is an explicit value: it is loaded once (from TOML, YAML or
//! JSON, or from defaults), optionally adjusted through `ASSETSTORE_*`
//! environment variables, validated, and then passed by reference to the
//! store, the adapters and the CLI. No component reads configuration from
//! process-global state.
//!
//! # Example
//!
//! ```no_run
//! use assetstore_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load_with_overrides("assetstore.toml")?;
//!
//!     println!("Web root: {}", config.app.web_root().display());
//!     println!("Hashed filenames: {}", !config.store.legacy_filenames);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{apply_env_overrides, apply_overrides_from, ConfigFormat, ConfigLoader, ENV_PREFIX};
pub use schema::*;
pub use validation::Validator;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();
        assert_eq!(config.app.base_path, PathBuf::from("."));
        assert_eq!(config.app.web_root(), PathBuf::from("./public"));
        assert_eq!(config.store.max_rename_attempts, 100);
        assert!(!config.store.legacy_filenames);
        assert_eq!(config.protected.handler_path, "assets");
        assert!(config.server.platform.is_none());
    }

    #[test]
    fn test_empty_public_dir_is_base_path() {
        let mut config = Config::default();
        config.app.public_dir.clear();
        assert_eq!(config.app.web_root(), PathBuf::from("."));
    }

    #[test]
    fn test_declaration_lookup() {
        let mut config = Config::default();
        assert!(config.server.declaration().is_none());

        config.server.platform = Some("Apache".to_string());
        assert_eq!(config.server.declaration().unwrap().file_name, ".htaccess");

        config.server.platform = Some("iis".to_string());
        assert_eq!(config.server.declaration().unwrap().file_name, "web.config");

        config.server.platform = Some("nginx".to_string());
        assert!(config.server.declaration().is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"visibility\": \"public\""));
        assert!(json.contains(".htaccess"));
    }
}
