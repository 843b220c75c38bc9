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

//! Content identity codec
//!
//! Pure functions mapping an asset's `(hash, filename, variant)` tuple to the
//! single file ID string a backend stores it under, and back.
//!
//! # Format
//!
//! ```text
//! [dir/]hash10/stem[__variant][.ext]     hashed mode (default)
//! [dir/]stem[__variant][.ext]            legacy mode
//! ```
//!
//! - `hash10` is the first 10 hex characters of the content hash, stored as
//!   its own directory segment.
//! - The extension runs from the first `.` of the base name, so
//!   `archive.tar.gz` has stem `archive` and extension `.tar.gz`.
//! - `__` separates the stem from the variant. Filenames are cleaned before
//!   encoding so they never contain `__` themselves.
//!
//! # Known limitation
//!
//! Decoding strips the segment directly above the base name whenever it is
//! exactly 10 hex characters. A legacy-mode asset stored as
//! `deadbeef00/photo.jpg` therefore decodes to `photo.jpg`. Telling a real
//! directory apart from a hash segment needs information the file ID does
//! not carry, so the heuristic is kept as is.
//!
//! # Examples
//!
//! ```
//! use assetstore_core::codec::{parse_file_id, FileIdCodec};
//!
//! let codec = FileIdCodec::hashed();
//! let id = codec
//!     .encode("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d", "reports/q1.txt", "")
//!     .unwrap();
//! assert_eq!(id, "reports/aaf4c61ddc/q1.txt");
//!
//! let thumb = codec
//!     .encode("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d", "photo.jpg", "thumb")
//!     .unwrap();
//! assert_eq!(thumb, "aaf4c61ddc/photo__thumb.jpg");
//!
//! let parsed = parse_file_id(&thumb);
//! assert_eq!(parsed.filename, "photo.jpg");
//! assert_eq!(parsed.variant, "thumb");
//! ```

use crate::error::{StoreError, StoreResult};
use crate::hash::{is_valid_hash, HASH_PREFIX_LEN};
use serde::Serialize;

/// Separates the stem from the variant inside the base name
pub const VARIANT_DELIMITER: &str = "__";

const DELIMITER_CHAR: char = '_';

/// Filename and variant recovered from a file ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFileId {
    /// Logical filename (hash and variant removed)
    pub filename: String,
    /// Variant token, empty for originals
    pub variant: String,
    /// Hash directory segment, if one was recognized
    pub hash_prefix: Option<String>,
}

/// Encoder for one filename mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileIdCodec {
    legacy: bool,
}

impl FileIdCodec {
    /// Codec for the given mode (`legacy = true` omits the hash segment)
    pub fn new(legacy: bool) -> Self {
        FileIdCodec { legacy }
    }

    /// Default mode: the hash prefix is a directory segment
    pub fn hashed() -> Self {
        Self::new(false)
    }

    /// Legacy mode: `dir/stem.ext` with no hash segment
    pub fn legacy() -> Self {
        Self::new(true)
    }

    /// Whether hash segments are omitted
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// Compute the file ID for a tuple
    ///
    /// The filename and variant are cleaned first. Fails with
    /// [`StoreError::InvalidInput`] when nothing is left of the filename or
    /// the variant contains a path separator or `.`, and with
    /// [`StoreError::InvalidHash`] when hashed mode gets a short or non-hex
    /// hash.
    pub fn encode(&self, hash: &str, filename: &str, variant: &str) -> StoreResult<String> {
        let filename = clean_filename(filename);
        if filename.is_empty() {
            return Err(StoreError::invalid_input("filename is empty after cleaning"));
        }
        let variant = clean_variant(variant)?;

        let (dir, stem, ext) = split_filename(&filename);

        let mut id = String::with_capacity(filename.len() + HASH_PREFIX_LEN + variant.len() + 4);
        if !dir.is_empty() {
            id.push_str(dir);
            id.push('/');
        }
        if !self.legacy {
            if !is_valid_hash(hash) {
                return Err(StoreError::InvalidHash(hash.to_string()));
            }
            id.push_str(&hash[..HASH_PREFIX_LEN].to_ascii_lowercase());
            id.push('/');
        }
        id.push_str(stem);
        if !variant.is_empty() {
            id.push_str(VARIANT_DELIMITER);
            id.push_str(&variant);
        }
        id.push_str(ext);

        Ok(id)
    }

    /// Decode a file ID; identical in both modes
    pub fn decode(&self, file_id: &str) -> ParsedFileId {
        parse_file_id(file_id)
    }
}

/// Normalize a user-supplied filename
///
/// Backslashes become `/`, empty, `.` and `..` segments are dropped, and
/// every run of two or more `_` collapses to a single `_`. Cleaning is
/// idempotent.
pub fn clean_filename(filename: &str) -> String {
    let normalized = filename.replace('\\', "/");
    let joined = normalized
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect::<Vec<_>>()
        .join("/");
    collapse_delimiters(&joined)
}

/// Normalize a variant token
///
/// Runs of `_` collapse and leading or trailing `_` are trimmed so the
/// variant can always be split back off the stem.
pub fn clean_variant(variant: &str) -> StoreResult<String> {
    let variant = collapse_delimiters(variant.trim());
    let variant = variant.trim_matches(DELIMITER_CHAR);
    if variant.contains(['/', '\\', '.']) {
        return Err(StoreError::invalid_input(format!(
            "variant {:?} must not contain '/', '\\' or '.'",
            variant
        )));
    }
    Ok(variant.to_string())
}

/// Split a cleaned filename into `(directory, stem, extension)`
///
/// The extension keeps its leading dot and starts at the first `.` of the
/// base name.
pub fn split_filename(filename: &str) -> (&str, &str, &str) {
    let (dir, base) = match filename.rfind('/') {
        Some(pos) => (&filename[..pos], &filename[pos + 1..]),
        None => ("", filename),
    };
    let (stem, ext) = match base.find('.') {
        Some(pos) => (&base[..pos], &base[pos..]),
        None => (base, ""),
    };
    (dir, stem, ext)
}

/// Recover filename and variant from a file ID
///
/// 1. The last `__` in the base name's stem (before the first `.`) splits off
///    the variant.
/// 2. The segment directly above the base name is dropped when it is exactly
///    10 hex characters.
pub fn parse_file_id(file_id: &str) -> ParsedFileId {
    let (dir, base) = match file_id.rfind('/') {
        Some(pos) => (&file_id[..pos], &file_id[pos + 1..]),
        None => ("", file_id),
    };

    let stem_end = base.find('.').unwrap_or(base.len());
    let (stem_part, ext) = base.split_at(stem_end);
    let (stem, variant) = match stem_part.rfind(VARIANT_DELIMITER) {
        Some(pos) => (
            &stem_part[..pos],
            &stem_part[pos + VARIANT_DELIMITER.len()..],
        ),
        None => (stem_part, ""),
    };

    let (parent, last_dir) = match dir.rfind('/') {
        Some(pos) => (&dir[..pos], &dir[pos + 1..]),
        None => ("", dir),
    };
    let (dir, hash_prefix) = if is_hash_segment(last_dir) {
        (parent, Some(last_dir.to_string()))
    } else {
        (dir, None)
    };

    let mut filename = String::with_capacity(file_id.len());
    if !dir.is_empty() {
        filename.push_str(dir);
        filename.push('/');
    }
    filename.push_str(stem);
    filename.push_str(ext);

    ParsedFileId {
        filename,
        variant: variant.to_string(),
        hash_prefix,
    }
}

/// Whether a directory segment looks like a hash prefix
pub fn is_hash_segment(segment: &str) -> bool {
    segment.len() == HASH_PREFIX_LEN && segment.bytes().all(|b| b.is_ascii_hexdigit())
}

fn collapse_delimiters(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_delim = false;
    for c in s.chars() {
        if c == DELIMITER_CHAR {
            if !prev_delim {
                out.push(c);
            }
            prev_delim = true;
        } else {
            out.push(c);
            prev_delim = false;
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HASH: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";

    #[test]
    fn encode_hashed() {
        let codec = FileIdCodec::hashed();
        assert_eq!(
            codec.encode(HASH, "reports/q1.txt", "").unwrap(),
            "reports/aaf4c61ddc/q1.txt"
        );
        assert_eq!(
            codec.encode(HASH, "folder/sub/photo.jpg", "resize_100").unwrap(),
            "folder/sub/aaf4c61ddc/photo__resize_100.jpg"
        );
    }

    #[test]
    fn encode_legacy() {
        let codec = FileIdCodec::legacy();
        assert_eq!(codec.encode("", "folder/file.jpg", "").unwrap(), "folder/file.jpg");
        assert_eq!(
            codec.encode("", "file.jpg", "thumb").unwrap(),
            "file__thumb.jpg"
        );
    }

    #[test]
    fn no_extension_no_directory() {
        let codec = FileIdCodec::hashed();
        assert_eq!(codec.encode(HASH, "README", "").unwrap(), "aaf4c61ddc/README");
        assert_eq!(
            codec.encode(HASH, "README", "v2").unwrap(),
            "aaf4c61ddc/README__v2"
        );
        assert_eq!(parse_file_id("aaf4c61ddc/README__v2").filename, "README");
    }

    #[test]
    fn multi_dot_extension() {
        let codec = FileIdCodec::hashed();
        let id = codec.encode(HASH, "backup.tar.gz", "small").unwrap();
        assert_eq!(id, "aaf4c61ddc/backup__small.tar.gz");

        let parsed = parse_file_id(&id);
        assert_eq!(parsed.filename, "backup.tar.gz");
        assert_eq!(parsed.variant, "small");
    }

    #[test]
    fn dotfile_has_empty_stem() {
        let codec = FileIdCodec::legacy();
        let id = codec.encode("", "conf/.env", "x").unwrap();
        assert_eq!(id, "conf/__x.env");
        let parsed = parse_file_id(&id);
        assert_eq!(parsed.filename, "conf/.env");
        assert_eq!(parsed.variant, "x");
    }

    #[test]
    fn cleaning() {
        assert_eq!(clean_filename("a__b___c.txt"), "a_b_c.txt");
        assert_eq!(clean_filename("../../etc/passwd"), "etc/passwd");
        assert_eq!(clean_filename("./a//b/./c.txt"), "a/b/c.txt");
        assert_eq!(clean_filename("dir\\sub\\f.png"), "dir/sub/f.png");
        assert_eq!(clean_filename(&clean_filename("x__y/../z")), clean_filename("x__y/../z"));
    }

    #[test]
    fn trailing_underscore_stem_round_trips() {
        let codec = FileIdCodec::hashed();
        let id = codec.encode(HASH, "draft_.md", "v").unwrap();
        assert_eq!(id, "aaf4c61ddc/draft___v.md");
        let parsed = parse_file_id(&id);
        assert_eq!(parsed.filename, "draft_.md");
        assert_eq!(parsed.variant, "v");
    }

    #[test]
    fn variant_cleaning() {
        assert_eq!(clean_variant("__thumb__").unwrap(), "thumb");
        assert_eq!(clean_variant("a__b").unwrap(), "a_b");
        assert!(clean_variant("a/b").is_err());
        assert!(clean_variant("x.png").is_err());
    }

    #[test]
    fn rejects_bad_input() {
        let codec = FileIdCodec::hashed();
        assert!(matches!(
            codec.encode(HASH, "../..", ""),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            codec.encode("abc", "a.txt", ""),
            Err(StoreError::InvalidHash(_))
        ));
        assert!(matches!(
            codec.encode("zzzzzzzzzzzz", "a.txt", ""),
            Err(StoreError::InvalidHash(_))
        ));
        // Legacy mode never looks at the hash
        assert!(FileIdCodec::legacy().encode("", "a.txt", "").is_ok());
    }

    #[test]
    fn decode_reports_hash_prefix() {
        let parsed = parse_file_id("reports/aaf4c61ddc/q1-1.txt");
        assert_eq!(parsed.filename, "reports/q1-1.txt");
        assert_eq!(parsed.variant, "");
        assert_eq!(parsed.hash_prefix.as_deref(), Some("aaf4c61ddc"));
    }

    #[test]
    fn decode_only_strips_parent_of_base_name() {
        let parsed = parse_file_id("0123456789/aaf4c61ddc/photo.jpg");
        assert_eq!(parsed.filename, "0123456789/photo.jpg");
    }

    #[test]
    fn hex_directory_false_positive_is_kept() {
        let id = FileIdCodec::legacy().encode("", "deadbeef00/photo.jpg", "").unwrap();
        let parsed = parse_file_id(&id);
        assert_eq!(parsed.filename, "photo.jpg");
        assert_eq!(parsed.hash_prefix.as_deref(), Some("deadbeef00"));
    }

    #[test]
    fn dots_in_directories_are_not_extensions() {
        let codec = FileIdCodec::hashed();
        let id = codec.encode(HASH, "v1.2/notes", "big").unwrap();
        assert_eq!(id, "v1.2/aaf4c61ddc/notes__big");
        assert_eq!(parse_file_id(&id).filename, "v1.2/notes");
    }
}
