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

//! SHA-1 content hashing
//!
//! Hashes are always computed over the exact bytes being stored, in
//! constant memory for files and streams.

use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Length of a full hex SHA-1 digest
pub const HASH_LEN: usize = 40;

/// Number of hash characters used as the directory segment of a file ID
pub const HASH_PREFIX_LEN: usize = 10;

const BUF_SIZE: usize = 64 * 1024;

/// Hash an in-memory buffer
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Hash everything `reader` yields (64KB at a time)
pub fn hash_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; BUF_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash a local file
pub fn hash_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path.as_ref())?;
    hash_reader(&mut file)
}

/// Whether `s` is usable as a content hash (at least the prefix length, hex only)
pub fn is_valid_hash(s: &str) -> bool {
    s.len() >= HASH_PREFIX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HELLO: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";

    #[test]
    fn known_digest() {
        assert_eq!(hash_bytes(b"hello"), HELLO);
        assert_eq!(hash_bytes(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn reader_matches_bytes() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let streamed = hash_reader(&mut Cursor::new(&data)).unwrap();
        assert_eq!(streamed, hash_bytes(&data));
        assert_eq!(streamed.len(), HASH_LEN);
    }

    #[test]
    fn file_hash() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();
        assert_eq!(hash_file(&path).unwrap(), HELLO);
        assert!(hash_file(dir.path().join("missing")).is_err());
    }

    #[test]
    fn hash_validation() {
        assert!(is_valid_hash(HELLO));
        assert!(is_valid_hash("aaf4c61ddc"));
        assert!(!is_valid_hash("aaf4c61dd"));
        assert!(!is_valid_hash("zzf4c61ddcc5"));
    }
}
