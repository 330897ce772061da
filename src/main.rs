mod cli;

use embedproxy::{
    config,
    providers::{MediaRequest, ProviderRegistry},
    server,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting embedproxy");
    tracing::info!(
        "Server will listen on {}:{} with {} providers",
        config.server.host,
        config.server.port,
        config.providers.len()
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "embedproxy=trace,tower_http=debug".to_string()
        } else {
            "embedproxy=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Providers => list_providers(cli.config.as_deref()),
        Commands::Url {
            server,
            media_type,
            id,
            season,
            episode,
        } => print_url(
            cli.config.as_deref(),
            &server,
            &media_type,
            &id,
            season.as_deref(),
            episode.as_deref(),
        ),
        Commands::Version => {
            println!("embedproxy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => println!("Validating config: {:?}", p),
        None => println!("No config file specified, searching default locations"),
    }

    let config = config::load_config_or_default(path)?;
    config::validate_config(&config)?;

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    if let Some(ref public_url) = config.server.public_url {
        println!("  Public URL: {}", public_url);
    }
    println!("  Providers: {}", config.providers.len());

    Ok(())
}

fn list_providers(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let registry = ProviderRegistry::from_config(&config.providers)?;

    for provider in registry.iter() {
        println!(
            "{:<12} {:<22} {:<13} {}",
            provider.name,
            provider.mount_path(),
            provider.template,
            provider.base_url
        );
    }

    Ok(())
}

fn print_url(
    config_path: Option<&Path>,
    server: &str,
    media_type: &str,
    id: &str,
    season: Option<&str>,
    episode: Option<&str>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let registry = ProviderRegistry::from_config(&config.providers)?;

    let request = MediaRequest::from_params(Some(server), Some(media_type), Some(id), season, episode)?;
    let upstream = request
        .upstream_url(&registry)
        .ok_or(embedproxy::error::Error::UrlNotGenerated)?;

    println!("{}", upstream);
    println!("{}", request.internal_path());
    Ok(())
}
