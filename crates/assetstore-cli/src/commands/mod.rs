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


// Command modules for the assetstore CLI
pub mod cache;
pub mod codec;
pub mod flush;
pub mod read;
pub mod store;

pub use cache::CacheCmd;
pub use codec::{EncodeCmd, ParseCmd};
pub use flush::FlushCmd;
pub use read::{CatCmd, InfoCmd, RmCmd, UrlCmd};
pub use store::StoreCmd;
