//! buildcache - Two-tier build artifact cache
//!
//! CLI entry point that dispatches to subcommands.

use buildcache::cli::{commands, Cli, Commands};
use buildcache::config::ConfigManager;
use buildcache::error::CacheResult;
use buildcache::Cache;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);
    debug!("Using config {}", manager.path().display());

    // Config command doesn't need a cache
    if let Commands::Config(args) = cli.command {
        return commands::config(args, &manager, &config).await;
    }

    let cache = Cache::from_config(&config).await?;

    // Ctrl-C aborts the in-flight durable store call
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Manifest(args) => commands::manifest(args, &cache, &cancel).await,
        Commands::Layer(args) => commands::layer(args, &cache, &cancel).await,
    };

    cache.shutdown().await;
    result
}

/// 0 = warn, 1 = info, 2+ = debug. Logs go to stderr; stdout carries payloads.
fn init_logging(verbose: u8, log_format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("buildcache=warn"),
        1 => EnvFilter::new("buildcache=info"),
        _ => EnvFilter::new("buildcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.with_target(false).without_time().init();
    }
}
