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

use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;

/// Validator for configuration settings
pub trait Validator {
    /// Check the settings, naming the first offending field
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.app.validate()?;
        self.store.validate()?;
        self.public.validate()?;
        self.protected.validate()?;
        self.server.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for AppConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.base_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("app.base_path".to_string()));
        }

        if self.base_url.is_empty() {
            return Err(ConfigError::MissingRequired("app.base_url".to_string()));
        }

        if self.public_dir.split(['/', '\\']).any(|seg| seg == "..") {
            return Err(ConfigError::invalid_value(
                "app.public_dir",
                "must not leave the base path",
            ));
        }

        Ok(())
    }
}

impl Validator for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_rename_attempts == 0 {
            return Err(ConfigError::invalid_value(
                "store.max_rename_attempts",
                "must be at least 1",
            ));
        }

        if let Some(dir) = &self.temp_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::invalid_value(
                    "store.temp_dir",
                    "must not be empty when set",
                ));
            }
        }

        Ok(())
    }
}

impl Validator for PublicAdapterConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_root("public.root", self.root.as_deref())
    }
}

impl Validator for ProtectedAdapterConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_root("protected.root", self.root.as_deref())?;

        if self.handler_path.trim_matches('/').is_empty() {
            return Err(ConfigError::MissingRequired(
                "protected.handler_path".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validator for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (platform, declaration) in &self.declarations {
            let name = declaration.file_name.as_str();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConfigError::invalid_value(
                    format!("server.declarations.{}.file_name", platform),
                    "must be a plain file name",
                ));
            }
        }
        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

fn validate_root(field: &str, root: Option<&str>) -> ConfigResult<()> {
    match root {
        Some(root) if root.trim().is_empty() => Err(ConfigError::invalid_value(
            field,
            "must not be empty when set",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_rename_attempts() {
        let mut config = Config::default();
        config.store.max_rename_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "store.max_rename_attempts"
        ));
    }

    #[test]
    fn test_public_dir_escape() {
        let mut config = Config::default();
        config.app.public_dir = "../outside".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_roots_rejected() {
        let mut config = Config::default();
        config.public.root = Some("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.protected.handler_path = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_declaration_file_name() {
        let mut config = Config::default();
        if let Some(decl) = config.server.declarations.get_mut("apache") {
            decl.file_name = "../.htaccess".to_string();
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();
        config.observability.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        config.observability.log_level = "DEBUG".to_string();
        config.observability.log_format = "json".to_string();
        assert!(config.validate().is_ok());
    }
}
