// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::NodeConfig;

/// Photo composite node
#[derive(Parser, Debug)]
#[command(name = "photo-composite-node")]
#[command(version)]
#[command(about = "Photo composite API with anonymous usage quotas", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve(serve::ServeArgs),

    /// Load and validate configuration, then print a summary
    CheckConfig,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => serve::serve(args).await,
        None => serve::serve(serve::ServeArgs::default()).await,
        Some(Commands::CheckConfig) => check_config(),
    }
}

fn check_config() -> Result<()> {
    let config = NodeConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    println!("Configuration OK");
    println!("  listen:    {}", config.server.listen_addr);
    println!(
        "  anonymous: {} quick / {} premium",
        config.quota.anonymous.quick_limit, config.quota.anonymous.premium_limit
    );
    println!(
        "  signed-in: {} quick / {} premium",
        config.quota.authenticated.quick_limit, config.quota.authenticated.premium_limit
    );
    println!("  window:    {}s", config.quota.window_seconds);
    println!("  counter:   {:?}", config.counter.backend);
    println!(
        "  generator: {}",
        config.generator.endpoint.as_deref().unwrap_or("(not configured)")
    );
    Ok(())
}
