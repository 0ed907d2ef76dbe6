//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// buildcache - Two-tier build artifact cache
///
/// Inspect and populate the manifest and layer caches an image builder
/// sits behind.
#[derive(Parser, Debug)]
#[command(name = "buildcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUILDCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch or store cached manifests
    Manifest(ManifestArgs),

    /// Fetch or store cached layer build entries
    Layer(LayerArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the manifest command
#[derive(Parser, Debug)]
pub struct ManifestArgs {
    #[command(subcommand)]
    pub action: ManifestAction,
}

/// Manifest subcommands
#[derive(Subcommand, Debug)]
pub enum ManifestAction {
    /// Print a cached manifest
    Get {
        /// Cache key
        key: String,
    },

    /// Store a manifest in both tiers
    Put {
        /// Cache key
        key: String,

        /// Read the manifest from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Arguments for the layer command
#[derive(Parser, Debug)]
pub struct LayerArgs {
    #[command(subcommand)]
    pub action: LayerAction,
}

/// Layer subcommands
#[derive(Subcommand, Debug)]
pub enum LayerAction {
    /// Print a cached layer entry as JSON
    Get {
        /// Cache key
        key: String,
    },

    /// Store a layer entry in both tiers
    Put {
        /// Cache key
        key: String,

        /// Layer content digest
        #[arg(long)]
        digest: String,

        /// Layer size in bytes
        #[arg(long)]
        size: u64,

        /// Uncompressed tarball hash
        #[arg(long)]
        tar_hash: Option<String>,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
