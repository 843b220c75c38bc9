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
use crate::schema::{Config, Visibility};
use crate::validation::Validator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "ASSETSTORE_";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        debug!("Configuration loaded from {}", format.name());
        self.finish(config)
    }

    /// Load a file, then apply `ASSETSTORE_*` environment overrides
    pub fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let mut config = Self::without_validation().load_file(path)?;
        apply_env_overrides(&mut config)?;
        self.finish(config)
    }

    /// Load `path` when given, otherwise start from defaults; environment
    /// overrides apply in both cases.
    pub fn load_or_default(&self, path: Option<&Path>) -> ConfigResult<Config> {
        let mut config = match path {
            Some(path) => Self::without_validation().load_file(path)?,
            None => {
                debug!("No configuration file given, using defaults");
                Config::default()
            }
        };
        apply_env_overrides(&mut config)?;
        self.finish(config)
    }

    fn finish(&self, config: Config) -> ConfigResult<Config> {
        if self.validate {
            config.validate()?;
            debug!("Configuration validated successfully");
        }
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    apply_overrides_from(config, |name| std::env::var(name).ok())
}

/// Apply `ASSETSTORE_*` overrides read through `lookup`
///
/// `lookup` receives the full variable name and returns its value if set.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let name = format!("{}{}", ENV_PREFIX, suffix);
        lookup(&name).map(|value| (name, value))
    };

    // App settings
    if let Some((_, value)) = var("BASE_PATH") {
        config.app.base_path = PathBuf::from(value);
    }
    if let Some((_, value)) = var("PUBLIC_DIR") {
        config.app.public_dir = value;
    }
    if let Some((_, value)) = var("BASE_URL") {
        config.app.base_url = value;
    }

    // Store settings
    if let Some((name, value)) = var("LEGACY_FILENAMES") {
        config.store.legacy_filenames = parse_bool(&name, &value)?;
    }
    if let Some((name, value)) = var("MAX_RENAME_ATTEMPTS") {
        config.store.max_rename_attempts = value.parse().map_err(|_| {
            ConfigError::env_var_parsing_error(&name, &value, "expected a positive integer")
        })?;
    }
    if let Some((_, value)) = var("TEMP_DIR") {
        config.store.temp_dir = Some(PathBuf::from(value));
    }
    if let Some((name, value)) = var("VISIBILITY") {
        config.store.visibility = Visibility::parse(&value).ok_or_else(|| {
            ConfigError::env_var_parsing_error(&name, &value, "expected 'public' or 'protected'")
        })?;
    }

    // Adapter roots
    if let Some((_, value)) = var("PUBLIC_ROOT") {
        config.public.root = Some(value);
    }
    if let Some((_, value)) = var("PROTECTED_ROOT") {
        config.protected.root = Some(value);
    }
    if let Some((_, value)) = var("HANDLER_PATH") {
        config.protected.handler_path = value;
    }

    // Server platform
    if let Some((_, value)) = var("SERVER_PLATFORM") {
        config.server.platform = Some(value);
    }

    // Observability settings
    if let Some((_, value)) = var("LOG_LEVEL") {
        config.observability.log_level = value;
    }
    if let Some((_, value)) = var("LOG_FORMAT") {
        config.observability.log_format = value;
    }

    Ok(())
}

/// Parse boolean from string (accepts: true, false, yes, no, 1, 0, on, off)
fn parse_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::env_var_parsing_error(
            name,
            value,
            "expected 'true', 'false', 'yes', 'no', '1', '0', 'on', or 'off'",
        )),
    }
}
