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

//! Structured logging for AssetStore
//!
//! Thin setup layer over `tracing-subscriber`: pretty, compact or JSON
//! output on stderr, filtered by an explicit level or `RUST_LOG`.
//!
//! ```no_run
//! use assetstore_observability::{init_tracing_with_config, LogConfig, LogFormat};
//!
//! let config = LogConfig::new()
//!     .with_format(LogFormat::Json)
//!     .with_level("assetstore_core=debug,info");
//! init_tracing_with_config(config).unwrap();
//! ```

pub mod config;
pub mod initialization;

pub use config::{level_for_verbosity, LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
