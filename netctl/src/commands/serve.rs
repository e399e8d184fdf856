//! `netctl serve`: run the HTTP bridge in the foreground

use crate::config::NetctlConfig;
use colored::*;
use netlens_adapter_in_memory::{InMemoryStore, DEMO_NETWORK};
use netlens_adapter_json::{JsonFileStore, JsonFileStoreConfig};
use netlens_core::errors::CoreError;
use netlens_core::{NetworkInspector, NetworkService, NetworkStore, PresentationAdapter};
use netlens_http_bridge::{HttpBridge, HttpBridgeConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Options of the serve command after CLI and config are merged
#[derive(Debug, Clone, PartialEq)]
pub struct ServeOptions {
    pub folder: PathBuf,
    pub bind_address: SocketAddr,
    pub demo: bool,
    pub load: Option<String>,
}

impl ServeOptions {
    pub fn resolve(
        config: &NetctlConfig,
        folder: Option<PathBuf>,
        bind: Option<SocketAddr>,
        demo: bool,
        load: Option<String>,
    ) -> Self {
        // The demo store only holds one network, so load it unless told otherwise
        let load = match (demo, load) {
            (true, None) => Some(DEMO_NETWORK.to_string()),
            (_, load) => load,
        };
        Self {
            folder: folder.unwrap_or_else(|| config.networks_folder.clone()),
            bind_address: bind.unwrap_or(config.bind_address),
            demo,
            load,
        }
    }
}

/// Build the service behind the bridge and load the startup network, if any
pub async fn build_service(options: &ServeOptions) -> Result<Arc<dyn NetworkService>, CoreError> {
    let store: Arc<dyn NetworkStore> = if options.demo {
        info!("Serving the built-in demo network");
        Arc::new(InMemoryStore::with_demo().await)
    } else {
        Arc::new(JsonFileStore::new(JsonFileStoreConfig::new(options.folder.clone())))
    };

    let service: Arc<dyn NetworkService> = Arc::new(NetworkInspector::new(store));

    if let Some(name) = &options.load {
        let summary = service.load_network(name).await?;
        info!(
            network = %summary.name,
            snapshots = summary.snapshots,
            "Startup network loaded"
        );
    }

    Ok(service)
}

/// Handle the serve command; returns once the server has shut down
pub async fn handle_serve_command(options: ServeOptions, config: &NetctlConfig) -> Result<(), CoreError> {
    let service = build_service(&options).await?;

    let bridge = Arc::new(HttpBridge::new(HttpBridgeConfig {
        bind_address: options.bind_address,
        enable_cors: config.enable_cors,
        request_timeout: config.timeout,
    }));

    let signal_bridge = Arc::clone(&bridge);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            if let Err(e) = signal_bridge.stop().await {
                error!("Failed to stop HTTP bridge: {}", e);
            }
        }
    });

    println!(
        "{} {}",
        "NetLens listening on".green().bold(),
        options.bind_address
    );
    bridge.start(service).await?;
    Ok(())
}
