//! Saved network commands

use crate::cli::NetworkCommands;
use crate::client::NetlensClient;
use crate::config::NetctlConfig;
use crate::output;
use netlens_core::errors::CoreError;
use netlens_http_bridge::{LoadNetworkResponse, NetworksResponse};
use tracing::info;

/// Handle network commands
pub async fn handle_network_command(command: NetworkCommands, config: &NetctlConfig) -> Result<(), CoreError> {
    let client = NetlensClient::new(config.clone())?;

    match command {
        NetworkCommands::List => {
            let response = client.get(&["networks"]).await?;
            let networks: NetworksResponse = client.handle_response(response).await?;
            println!("{}", output::render_networks(&networks, &config.default_format)?);
        }
        NetworkCommands::Load { name } => {
            info!("Loading network {}", name);
            let response = client
                .post_form(&["load_network"], &[("network", name.as_str())])
                .await?;
            let loaded: LoadNetworkResponse = client.handle_response(response).await?;
            println!("{}", output::render_loaded(&loaded, &config.default_format)?);
        }
    }

    Ok(())
}
