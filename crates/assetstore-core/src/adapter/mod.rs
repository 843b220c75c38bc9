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

//! Path / visibility adapters
//!
//! Adapters are local-disk backends that also know where they sit relative
//! to the web root:
//!
//! - [`PublicAdapter`]: content the web server hands out directly. URLs are
//!   derived from the root's position under the web root.
//! - [`ProtectedAdapter`]: content behind an access-checked request handler.
//!   URLs always route through that handler.
//!
//! Both resolve their root with [`resolve_root`], provision the server's
//! access-control declaration file on construction (see
//! [`declaration::provision`]), and reserve hidden directories and the
//! declaration file name so stored assets can never shadow them.

// Implement `StorageBackend` for an adapter by delegating to its
// `backend` field after reserved-key checks
macro_rules! delegate_storage_backend {
    ($adapter:ty) => {
        impl assetstore_storage::StorageBackend for $adapter {
            fn exists(&self, key: &str) -> anyhow::Result<bool> {
                self.check_key(key)?;
                assetstore_storage::StorageBackend::exists(&self.backend, key)
            }

            fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
                self.check_key(key)?;
                assetstore_storage::StorageBackend::get(&self.backend, key)
            }

            fn get_stream(&self, key: &str) -> anyhow::Result<Box<dyn std::io::Read + Send>> {
                self.check_key(key)?;
                assetstore_storage::StorageBackend::get_stream(&self.backend, key)
            }

            fn put(&self, key: &str, data: &[u8]) -> anyhow::Result<()> {
                self.check_key(key)?;
                assetstore_storage::StorageBackend::put(&self.backend, key, data)
            }

            fn put_stream(&self, key: &str, reader: &mut dyn std::io::Read) -> anyhow::Result<u64> {
                self.check_key(key)?;
                assetstore_storage::StorageBackend::put_stream(&self.backend, key, reader)
            }

            fn delete(&self, key: &str) -> anyhow::Result<()> {
                self.check_key(key)?;
                assetstore_storage::StorageBackend::delete(&self.backend, key)
            }

            fn metadata(&self, key: &str) -> anyhow::Result<assetstore_storage::ObjectMetadata> {
                self.check_key(key)?;
                assetstore_storage::StorageBackend::metadata(&self.backend, key)
            }

            fn list_objects(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
                let declaration = self.declaration_file_name();
                Ok(assetstore_storage::StorageBackend::list_objects(&self.backend, prefix)?
                    .into_iter()
                    .filter(|key| Some(key.as_str()) != declaration)
                    .collect())
            }

            fn as_url_resolvable(&self) -> Option<&dyn assetstore_storage::UrlResolvable> {
                Some(self)
            }
        }
    };
}

pub(crate) use delegate_storage_backend;

pub mod declaration;
pub mod protected;
pub mod public;

pub use protected::ProtectedAdapter;
pub use public::PublicAdapter;

use crate::error::StoreResult;
use assetstore_config::{Config, Visibility};
use assetstore_storage::{StorageBackend, StorageError};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Resolve a configured root override
///
/// - `None` or blank: `default`
/// - absolute: used verbatim
/// - `./x`, `x`: `base_path/x`
/// - `../x`: one level above `web_root`
///
/// The result is normalized lexically; the filesystem is not consulted.
pub fn resolve_root(root: Option<&str>, base_path: &Path, web_root: &Path, default: PathBuf) -> PathBuf {
    let root = match root.map(str::trim).filter(|r| !r.is_empty()) {
        Some(root) => root,
        None => return normalize_path(&default),
    };

    let path = Path::new(root);
    if path.is_absolute() {
        normalize_path(path)
    } else if matches!(path.components().next(), Some(Component::ParentDir)) {
        normalize_path(&web_root.join(path))
    } else {
        normalize_path(&base_path.join(path))
    }
}

/// Default public root: `<web_root>/assets`
pub fn default_public_root(config: &Config) -> PathBuf {
    config.app.web_root().join("assets")
}

/// Default protected root: `<web_root>/assets/.protected`
pub fn default_protected_root(config: &Config) -> PathBuf {
    default_public_root(config).join(".protected")
}

/// Open the adapter selected by `visibility`
pub fn open_adapter(config: &Config, visibility: Visibility) -> StoreResult<Arc<dyn StorageBackend>> {
    Ok(match visibility {
        Visibility::Public => Arc::new(PublicAdapter::from_config(config)?),
        Visibility::Protected => Arc::new(ProtectedAdapter::from_config(config)?),
    })
}

/// Join a URL base and a path with exactly one `/` between them
pub fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Percent-encode each `/`-separated segment of a key for use in a URL path
pub fn encode_url_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collapse `.` and `..` components without touching the filesystem
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Reject keys an adapter reserves for itself
pub(crate) fn check_reserved_key(key: &str, declaration_file: Option<&str>) -> Result<(), StorageError> {
    let mut segments = key.split('/').peekable();
    while let Some(segment) = segments.next() {
        let is_dir = segments.peek().is_some();
        if is_dir && segment.starts_with('.') {
            return Err(StorageError::invalid_key(format!(
                "hidden directory segment in key: {}",
                key
            )));
        }
    }
    if declaration_file == Some(key) {
        return Err(StorageError::invalid_key(format!(
            "key is reserved for the server declaration file: {}",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults_and_overrides() {
        let base = Path::new("/srv/site");
        let web = Path::new("/srv/site/public");
        let default = PathBuf::from("/srv/site/public/assets");

        assert_eq!(resolve_root(None, base, web, default.clone()), default);
        assert_eq!(resolve_root(Some("  "), base, web, default.clone()), default);
        assert_eq!(
            resolve_root(Some("/data/assets"), base, web, default.clone()),
            PathBuf::from("/data/assets")
        );
        assert_eq!(
            resolve_root(Some("./media"), base, web, default.clone()),
            PathBuf::from("/srv/site/media")
        );
        assert_eq!(
            resolve_root(Some("media/files"), base, web, default.clone()),
            PathBuf::from("/srv/site/media/files")
        );
        assert_eq!(
            resolve_root(Some("../private"), base, web, default),
            PathBuf::from("/srv/site/private")
        );
    }

    #[test]
    fn parent_override_with_empty_public_dir() {
        let base = Path::new("/srv/site");
        assert_eq!(
            resolve_root(Some("../private"), base, base, PathBuf::new()),
            PathBuf::from("/srv/private")
        );
        assert_eq!(
            resolve_root(Some("../../shared/x"), base, Path::new("/srv/site/public"), PathBuf::new()),
            PathBuf::from("/srv/shared/x")
        );
    }

    #[test]
    fn relative_base_keeps_leading_parent() {
        let resolved = resolve_root(Some("../private"), Path::new("."), Path::new("."), PathBuf::new());
        assert_eq!(resolved, PathBuf::from("../private"));
    }

    #[test]
    fn default_roots_follow_web_root() {
        let mut config = Config::default();
        config.app.base_path = PathBuf::from("/srv/site");
        assert_eq!(default_public_root(&config), PathBuf::from("/srv/site/public/assets"));
        assert_eq!(
            default_protected_root(&config),
            PathBuf::from("/srv/site/public/assets/.protected")
        );
    }

    #[test]
    fn url_joining() {
        assert_eq!(join_url("/", "assets"), "/assets");
        assert_eq!(join_url("https://x.test/", "/a/b/"), "https://x.test/a/b");
        assert_eq!(join_url("https://x.test", "a"), "https://x.test/a");
        assert_eq!(join_url("/base/", ""), "/base/");
    }

    #[test]
    fn url_path_segments_are_encoded() {
        assert_eq!(encode_url_path("reports/aaf4c61ddc/q1.txt"), "reports/aaf4c61ddc/q1.txt");
        assert_eq!(
            encode_url_path("my docs/aaf4c61ddc/a#1?.pdf"),
            "my%20docs/aaf4c61ddc/a%231%3F.pdf"
        );
        assert_eq!(encode_url_path("caf\u{e9}/x.txt"), "caf%C3%A9/x.txt");
    }

    #[test]
    fn reserved_keys() {
        assert!(check_reserved_key("a/b/.env", None).is_ok());
        assert!(check_reserved_key(".protected/aaf4c61ddc/x.txt", None).is_err());
        assert!(check_reserved_key("a/.git/config", None).is_err());
        assert!(check_reserved_key(".htaccess", Some(".htaccess")).is_err());
        assert!(check_reserved_key("docs/.htaccess", Some(".htaccess")).is_ok());
    }
}
