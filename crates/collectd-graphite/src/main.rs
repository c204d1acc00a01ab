// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! collectd to Graphite bridge CLI
//!
//! # Usage
//!
//! ```bash
//! # Defaults: Graphite on localhost:2003, HTTP on 0.0.0.0:9292
//! collectd-graphite
//!
//! # Custom endpoints
//! collectd-graphite --graphite carbon:2003 --http 127.0.0.1:9000
//!
//! # Using configuration file (flags override file values)
//! collectd-graphite --config collectd-graphite.toml --log-level debug
//!
//! # Write an example configuration
//! collectd-graphite gen-config -o collectd-graphite.toml
//! ```

use clap::{Parser, Subcommand};
use collectd_graphite::{Bridge, BridgeConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// collectd write_http JSON to Graphite plaintext bridge
#[derive(Parser, Debug)]
#[command(name = "collectd-graphite")]
#[command(about = "Bridge collectd write_http JSON batches to a Graphite line receiver")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Graphite line receiver (host:port)
    #[arg(short, long)]
    graphite: Option<String>,

    /// HTTP listen address (host:port)
    #[arg(long)]
    http: Option<String>,

    /// Metric path prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// Answer undecodable batches with 200 instead of 400
    #[arg(long)]
    legacy_status: bool,

    /// Statistics reporting interval (seconds, 0 to disable)
    #[arg(long)]
    stats_interval: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "collectd-graphite.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let config = build_config(&args)?;

    // Initialize logging
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("collectd-graphite v{}", env!("CARGO_PKG_VERSION"));

    let bridge = Bridge::start(config).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    bridge.shutdown().await?;

    Ok(())
}

fn build_config(args: &Args) -> Result<BridgeConfig, Box<dyn std::error::Error>> {
    let mut config = match args.config {
        Some(ref path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::default(),
    };

    if let Some(ref graphite) = args.graphite {
        config.graphite = graphite.clone();
    }
    if let Some(ref http) = args.http {
        config.listen = http.clone();
    }
    if let Some(ref prefix) = args.prefix {
        config.prefix = prefix.clone();
    }
    if args.legacy_status {
        config.legacy_status_codes = true;
    }
    if let Some(secs) = args.stats_interval {
        config.stats_interval_secs = secs;
    }
    if let Some(ref level) = args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let example = BridgeConfig::default().to_toml()?;
    std::fs::write(&output, example)?;
    println!("Generated configuration: {}", output.display());
    Ok(())
}

fn cmd_validate(config: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = BridgeConfig::from_file(&config)?;
    println!("Configuration is valid: {}", config.display());
    println!("  Graphite: {}", parsed.graphite);
    println!("  Listen:   {}", parsed.listen);
    println!("  Prefix:   {}", parsed.prefix);
    Ok(())
}
