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

//! Logging configuration
//!
//! Level resolution order: an explicit level, then `RUST_LOG`, then `info`.

use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while configuring logging
#[derive(Error, Debug)]
pub enum LogError {
    /// Level or filter directive that `EnvFilter` cannot parse
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Unknown output format name
    #[error("unknown log format '{0}', expected one of: pretty, compact, json")]
    InvalidFormat(String),

    /// A global subscriber was installed earlier in this process
    #[error("logging is already initialized: {0}")]
    AlreadyInitialized(String),

    /// Writing log output failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-oriented output
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Lowercase name, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Standard error, keeping stdout free for command output
    #[default]
    Stderr,
    /// Standard output
    Stdout,
}

/// Logging setup
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format
    pub format: LogFormat,

    /// Level or `EnvFilter` directive; `None` defers to `RUST_LOG`
    pub level: Option<String>,

    /// ANSI colors (ignored for JSON)
    pub use_color: bool,

    /// Timestamp on every event
    pub use_timestamps: bool,

    /// Module path of the emitting code
    pub include_targets: bool,

    /// Destination stream
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Pretty,
            level: None,
            use_color: true,
            use_timestamps: true,
            include_targets: true,
            output: LogOutput::Stderr,
        }
    }
}

impl LogConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the level or filter directive
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Enable or disable colors
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Enable or disable timestamps
    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    /// Enable or disable module targets
    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }

    /// Set the destination stream
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Level actually applied: explicit, else `RUST_LOG`, else `info`
    pub fn effective_level(&self) -> String {
        self.resolve_level(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_level<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        self.level
            .clone()
            .filter(|l| !l.trim().is_empty())
            .or_else(|| lookup("RUST_LOG").filter(|l| !l.trim().is_empty()))
            .unwrap_or_else(|| "info".to_string())
    }
}

/// Level selected by `-v`/`-q` style command-line flags
///
/// `quiet` wins over any verbosity. Returns `None` when no flag was given so
/// the configured level applies.
pub fn level_for_verbosity(verbose: u8, quiet: bool) -> Option<&'static str> {
    if quiet {
        return Some("error");
    }
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!(" Compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(LogError::InvalidFormat(_))
        ));
    }

    #[test]
    fn format_display_round_trips() {
        for format in [LogFormat::Pretty, LogFormat::Compact, LogFormat::Json] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }

    #[test]
    fn level_resolution_order() {
        let env = |_: &str| Some("warn".to_string());
        let no_env = |_: &str| None;

        assert_eq!(LogConfig::new().with_level("debug").resolve_level(env), "debug");
        assert_eq!(LogConfig::new().resolve_level(env), "warn");
        assert_eq!(LogConfig::new().resolve_level(no_env), "info");
        assert_eq!(LogConfig::new().with_level(" ").resolve_level(no_env), "info");
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(level_for_verbosity(0, false), None);
        assert_eq!(level_for_verbosity(1, false), Some("debug"));
        assert_eq!(level_for_verbosity(3, false), Some("trace"));
        assert_eq!(level_for_verbosity(2, true), Some("error"));
    }
}
