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

//! Extension based MIME type lookup

use std::path::Path;

/// Guess the MIME type of a key from its final extension
///
/// Matching is case-insensitive. Unknown extensions yield `None`.
pub fn guess_mime_type(key: &str) -> Option<&'static str> {
    mime_guess::from_path(Path::new(key)).first_raw()
}
