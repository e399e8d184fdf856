//! Queries against the active network of a running bridge

use crate::client::NetlensClient;
use crate::config::NetctlConfig;
use crate::output;
use netlens_core::errors::CoreError;
use netlens_core::prelude::{ComponentAttributes, StaticTableView, VaryingSeries};
use netlens_http_bridge::ComponentsResponse;

/// `netctl components`
pub async fn handle_components_command(config: &NetctlConfig) -> Result<(), CoreError> {
    let client = NetlensClient::new(config.clone())?;
    let response = client.get(&["get_components"]).await?;
    let body: ComponentsResponse = client.handle_response(response).await?;
    println!("{}", output::render_components(&body.components, &config.default_format)?);
    Ok(())
}

/// `netctl attributes <component>`
pub async fn handle_attributes_command(component: &str, config: &NetctlConfig) -> Result<(), CoreError> {
    let client = NetlensClient::new(config.clone())?;
    let response = client.get(&["get_attributes", component]).await?;
    let attributes: ComponentAttributes = client.handle_response(response).await?;
    println!(
        "{}",
        output::render_attributes(component, &attributes, &config.default_format)?
    );
    Ok(())
}

/// `netctl static <component>`
pub async fn handle_static_command(component: &str, config: &NetctlConfig) -> Result<(), CoreError> {
    let client = NetlensClient::new(config.clone())?;
    let response = client.get(&["get_data", component, "all", "static"]).await?;
    let table: StaticTableView = client.handle_response(response).await?;
    println!("{}", output::render_static_table(&table, &config.default_format)?);
    Ok(())
}

/// `netctl varying <component> <attribute>`
pub async fn handle_varying_command(
    component: &str,
    attribute: &str,
    config: &NetctlConfig,
) -> Result<(), CoreError> {
    let client = NetlensClient::new(config.clone())?;
    let response = client
        .get(&["get_data", component, attribute, "varying"])
        .await?;
    let series: VaryingSeries = client.handle_response(response).await?;
    println!("{}", output::render_varying_series(&series, &config.default_format)?);
    Ok(())
}
