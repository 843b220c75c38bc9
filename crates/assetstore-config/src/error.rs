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

//! Configuration errors
//!
//! Every variant names the file, variable or dotted field at fault so the
//! CLI can print it without extra context.

use std::path::PathBuf;
use thiserror::Error;

/// Loading, override or validation failure
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// Bad TOML
    #[error("invalid TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Bad YAML
    #[error("invalid YAML configuration: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    /// Bad JSON
    #[error("invalid JSON configuration: {0}")]
    JsonParseError(#[from] serde_json::error::Error),

    /// Extension is not toml, yaml, yml or json
    #[error("unsupported configuration format '{0}' (expected toml, yaml or json)")]
    UnsupportedFormat(String),

    /// No file at the given path
    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// No extension to pick a format from
    #[error("cannot detect configuration format of {}", .0.display())]
    InvalidPath(PathBuf),

    /// An `ASSETSTORE_*` variable holds something unparseable
    #[error("bad environment override {variable_name}={value:?}: {reason}")]
    EnvVarParsingError {
        /// Variable name
        variable_name: String,
        /// Offending value
        value: String,
        /// What was expected
        reason: String,
    },

    /// A field holds an unusable value
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted field path
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// A required field is empty
    #[error("'{0}' must not be empty")]
    MissingRequired(String),
}

impl ConfigError {
    /// Override `variable_name=value` could not be parsed
    pub fn env_var_parsing_error(
        variable_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::EnvVarParsingError {
            variable_name: variable_name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// `field` holds an unusable value
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = ConfigError::env_var_parsing_error("ASSETSTORE_MAX_RENAME_ATTEMPTS", "lots", "expected a positive integer");
        assert_eq!(
            err.to_string(),
            "bad environment override ASSETSTORE_MAX_RENAME_ATTEMPTS=\"lots\": expected a positive integer"
        );
        assert_eq!(
            ConfigError::MissingRequired("app.base_url".to_string()).to_string(),
            "'app.base_url' must not be empty"
        );
    }
}
