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
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration structure
///
/// Built once at startup and handed to the store and adapters; nothing in
/// the workspace reads configuration from global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Application layout (base path, web root, base URL)
    pub app: AppConfig,

    /// Asset store behavior
    pub store: StoreConfig,

    /// Public adapter settings
    pub public: PublicAdapterConfig,

    /// Protected adapter settings
    pub protected: ProtectedAdapterConfig,

    /// Web server platform and access-control declaration files
    pub server: ServerConfig,

    /// Logging settings
    pub observability: ObservabilityConfig,
}

/// Application layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Application base directory; relative adapter roots resolve against it
    pub base_path: PathBuf,

    /// Web root, relative to `base_path` (empty means the base path itself)
    pub public_dir: String,

    /// URL the web root is served under
    pub base_url: String,
}

impl AppConfig {
    /// Absolute-or-relative directory served by the web server
    pub fn web_root(&self) -> PathBuf {
        if self.public_dir.is_empty() {
            self.base_path.clone()
        } else {
            self.base_path.join(&self.public_dir)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_path: PathBuf::from("."),
            public_dir: "public".to_string(),
            base_url: "/".to_string(),
        }
    }
}

/// Which adapter a tool should write through
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Directly servable content
    #[default]
    Public,
    /// Content routed through an access-checked handler
    Protected,
}

impl Visibility {
    /// Parse a visibility name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            _ => None,
        }
    }
}

/// Asset store behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Omit the hash directory from file IDs (`folder/file.jpg`)
    pub legacy_filenames: bool,

    /// Upper bound on rename candidates tried before giving up
    pub max_rename_attempts: usize,

    /// Directory for spooling non-seekable uploads (system temp dir if unset)
    pub temp_dir: Option<PathBuf>,

    /// Adapter used by tooling
    pub visibility: Visibility,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            legacy_filenames: false,
            max_rename_attempts: default_max_rename_attempts(),
            temp_dir: None,
            visibility: Visibility::Public,
        }
    }
}

/// Public adapter settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PublicAdapterConfig {
    /// Root override: absolute, `./`-relative or bare paths under the base
    /// path, `../x` one level above the web root. Defaults to
    /// `<web_root>/assets`.
    pub root: Option<String>,
}

/// Protected adapter settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProtectedAdapterConfig {
    /// Root override, same conventions as the public root. Defaults to
    /// `<web_root>/assets/.protected`.
    pub root: Option<String>,

    /// Path below `base_url` of the access-controlled request handler
    pub handler_path: String,
}

impl Default for ProtectedAdapterConfig {
    fn default() -> Self {
        ProtectedAdapterConfig {
            root: None,
            handler_path: default_handler_path(),
        }
    }
}

/// Access-control declaration file for one server platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerDeclaration {
    /// File name written at the adapter root
    pub file_name: String,

    /// Contents for a public root
    pub public_content: String,

    /// Contents for a protected root
    pub protected_content: String,
}

/// Web server platform settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Platform the assets are served by (`apache`, `iis`, ...). Unknown or
    /// unset platforms get no declaration files.
    pub platform: Option<String>,

    /// Recognized platforms
    pub declarations: BTreeMap<String, ServerDeclaration>,
}

impl ServerConfig {
    /// Declaration for the configured platform, if it is recognized
    pub fn declaration(&self) -> Option<&ServerDeclaration> {
        self.platform
            .as_deref()
            .and_then(|platform| self.declarations.get(&platform.to_ascii_lowercase()))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            platform: None,
            declarations: default_declarations(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter
    pub log_level: String,

    /// Output format (pretty, compact, json)
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

fn default_max_rename_attempts() -> usize {
    100
}

fn default_handler_path() -> String {
    "assets".to_string()
}

const APACHE_PUBLIC: &str = r#"# Generated by AssetStore
<IfModule mod_rewrite.c>
    RewriteEngine On
    RewriteRule ^\.protected(/|$) - [F,L]
</IfModule>
<FilesMatch "\.(php|phtml|php[0-9]|phar|inc|cgi|pl|py|sh)$">
    Require all denied
</FilesMatch>
"#;

const APACHE_PROTECTED: &str = "# Generated by AssetStore\nRequire all denied\n";

const IIS_PUBLIC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- Generated by AssetStore -->
<configuration>
    <system.webServer>
        <security>
            <requestFiltering>
                <hiddenSegments>
                    <add segment=".protected" />
                </hiddenSegments>
                <fileExtensions allowUnlisted="true">
                    <add fileExtension=".php" allowed="false" />
                </fileExtensions>
            </requestFiltering>
        </security>
    </system.webServer>
</configuration>
"#;

const IIS_PROTECTED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- Generated by AssetStore -->
<configuration>
    <system.webServer>
        <authorization>
            <deny users="*" />
        </authorization>
    </system.webServer>
</configuration>
"#;

fn default_declarations() -> BTreeMap<String, ServerDeclaration> {
    let mut table = BTreeMap::new();
    table.insert(
        "apache".to_string(),
        ServerDeclaration {
            file_name: ".htaccess".to_string(),
            public_content: APACHE_PUBLIC.to_string(),
            protected_content: APACHE_PROTECTED.to_string(),
        },
    );
    table.insert(
        "iis".to_string(),
        ServerDeclaration {
            file_name: "web.config".to_string(),
            public_content: IIS_PUBLIC.to_string(),
            protected_content: IIS_PROTECTED.to_string(),
        },
    );
    table
}
