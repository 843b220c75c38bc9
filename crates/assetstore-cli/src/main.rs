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


mod commands;
mod context;
mod output;

use anyhow::Result;
use assetstore_config::Visibility;
use assetstore_observability::{init_tracing_with_config, level_for_verbosity, LogConfig, LogFormat};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use context::{load_config, parse_visibility};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "assetstore")]
#[command(version, about = "Content-addressable asset storage")]
#[command(
    long_about = "AssetStore keeps uploaded and generated files under deterministic IDs derived
from their SHA-1 hash, filename and variant, in a public or access-protected directory."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Adapter to use, overriding store.visibility (public|protected)
    #[arg(long, global = true, value_name = "VISIBILITY", value_parser = parse_visibility)]
    visibility: Option<Visibility>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a file (or stdin) and print its identity
    Store(StoreCmd),

    /// Write an asset's bytes to stdout
    Cat(CatCmd),

    /// Print the URL of an asset
    Url(UrlCmd),

    /// Show metadata for an asset
    Info(InfoCmd),

    /// Delete an asset (an original takes its variants with it)
    Rm(RmCmd),

    /// Decode a file ID into filename and variant
    Parse(ParseCmd),

    /// Encode a hash, filename and variant into a file ID
    Encode(EncodeCmd),

    /// Generated asset cache operations
    #[command(subcommand)]
    Cache(CacheCmd),

    /// (Re)write the server declaration file at the adapter root
    Flush(FlushCmd),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        other => {
            output::error(&format!("Invalid color option: {}", other));
            std::process::exit(2);
        }
    }

    if let Err(e) = run(cli) {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that need neither configuration nor logging
    match &cli.command {
        Commands::Version => {
            print_version();
            return Ok(());
        }
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "assetstore", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability, cli.verbose, cli.quiet, &cli.color);

    let visibility = cli.visibility.unwrap_or(config.store.visibility);

    match cli.command {
        Commands::Store(cmd) => cmd.execute(&config, visibility),
        Commands::Cat(cmd) => cmd.execute(&config, visibility),
        Commands::Url(cmd) => cmd.execute(&config, visibility),
        Commands::Info(cmd) => cmd.execute(&config, visibility),
        Commands::Rm(cmd) => cmd.execute(&config, visibility),
        Commands::Parse(cmd) => cmd.execute(&config),
        Commands::Encode(cmd) => cmd.execute(&config),
        Commands::Cache(cmd) => cmd.execute(&config, visibility),
        Commands::Flush(cmd) => cmd.execute(&config, visibility),
        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}

fn init_logging(settings: &assetstore_config::ObservabilityConfig, verbose: u8, quiet: bool, color: &str) {
    let level = level_for_verbosity(verbose, quiet)
        .map(str::to_string)
        .unwrap_or_else(|| settings.log_level.clone());
    let format = settings.log_format.parse().unwrap_or(LogFormat::Pretty);
    let use_color = color != "never" && console::colors_enabled_stderr();

    let config = LogConfig::new()
        .with_format(format)
        .with_level(level)
        .with_color(use_color);

    // Logging is best effort; a bad filter must not block the command
    if let Err(e) = init_tracing_with_config(config) {
        output::warning(&format!("Logging disabled: {}", e));
    }
}

fn print_version() {
    println!("assetstore {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}
