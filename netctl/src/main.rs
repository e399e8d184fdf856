//! Command-line interface for NetLens

use clap::Parser;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod commands;
mod config;
mod output;

use cli::*;
use commands::serve::ServeOptions;
use config::NetctlConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = match NetctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Override config with CLI args
    let config = config.with_overrides(&args);

    info!("Starting netctl with endpoint: {}", config.endpoint);

    let result = match args.command {
        Commands::Serve {
            folder,
            bind,
            demo,
            load,
        } => {
            let options = ServeOptions::resolve(&config, folder, bind, demo, load);
            commands::serve::handle_serve_command(options, &config).await
        }
        Commands::Networks { command } => {
            commands::network::handle_network_command(command, &config).await
        }
        Commands::Components => commands::inspect::handle_components_command(&config).await,
        Commands::Attributes { component } => {
            commands::inspect::handle_attributes_command(&component, &config).await
        }
        Commands::Static { component } => {
            commands::inspect::handle_static_command(&component, &config).await
        }
        Commands::Varying {
            component,
            attribute,
        } => commands::inspect::handle_varying_command(&component, &attribute, &config).await,
        Commands::Health => commands::health::handle_health_command(&config).await,
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
