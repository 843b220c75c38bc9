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

//! How bytes reach the backend once a target file ID has been chosen
//!
//! The store decides *where* to write (codec plus conflict policy); a
//! [`WriteStrategy`] decides *how*. Each strategy performs at most one
//! physical write per call.

use assetstore_storage::StorageBackend;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Writes a payload to the backend under a given file ID
pub trait WriteStrategy {
    /// Persist the payload under `file_id`
    fn write(&mut self, backend: &dyn StorageBackend, file_id: &str) -> anyhow::Result<()>;
}

/// In-memory payload
#[derive(Debug, Clone, Copy)]
pub struct BytesWrite<'a> {
    data: &'a [u8],
}

impl<'a> BytesWrite<'a> {
    /// Write `data` as is
    pub fn new(data: &'a [u8]) -> Self {
        BytesWrite { data }
    }
}

impl WriteStrategy for BytesWrite<'_> {
    fn write(&mut self, backend: &dyn StorageBackend, file_id: &str) -> anyhow::Result<()> {
        backend.put(file_id, self.data)
    }
}

/// Seekable caller-owned stream, written from a fixed start offset
///
/// The stream is rewound to the start offset before the write and is left
/// open afterwards.
#[derive(Debug)]
pub struct StreamWrite<'a, R: Read + Seek> {
    reader: &'a mut R,
    start: u64,
}

impl<'a, R: Read + Seek> StreamWrite<'a, R> {
    /// Write everything in `reader` from offset `start` onward
    pub fn new(reader: &'a mut R, start: u64) -> Self {
        StreamWrite { reader, start }
    }
}

impl<R: Read + Seek> WriteStrategy for StreamWrite<'_, R> {
    fn write(&mut self, backend: &dyn StorageBackend, file_id: &str) -> anyhow::Result<()> {
        self.reader.seek(SeekFrom::Start(self.start))?;
        backend.put_stream(file_id, &mut *self.reader)?;
        Ok(())
    }
}

/// Local file, opened only when the write actually happens
#[derive(Debug, Clone, Copy)]
pub struct PathWrite<'a> {
    path: &'a Path,
}

impl<'a> PathWrite<'a> {
    /// Stream the file at `path`
    pub fn new(path: &'a Path) -> Self {
        PathWrite { path }
    }
}

impl WriteStrategy for PathWrite<'_> {
    fn write(&mut self, backend: &dyn StorageBackend, file_id: &str) -> anyhow::Result<()> {
        let mut file = File::open(self.path)?;
        backend.put_stream(file_id, &mut file)?;
        Ok(())
    }
}
