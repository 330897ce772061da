use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "embedproxy")]
#[command(author, version, about = "Reverse proxy for video embed providers")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// List configured providers
    Providers,

    /// Print the upstream URL generated for a movie or TV episode
    Url {
        /// Provider name (case-insensitive)
        #[arg(long)]
        server: String,

        /// Media type: movie or tv
        #[arg(long = "type", value_name = "TYPE")]
        media_type: String,

        /// Media identifier (e.g. IMDb or TMDB id)
        #[arg(long)]
        id: String,

        /// Season number (tv only)
        #[arg(long)]
        season: Option<String>,

        /// Episode number (tv only)
        #[arg(long)]
        episode: Option<String>,
    },

    /// Display version information
    Version,
}
