//! Health check command implementation

use crate::client::NetlensClient;
use crate::config::NetctlConfig;
use colored::*;
use netlens_core::errors::CoreError;
use netlens_http_bridge::HealthStatus;
use tracing::info;

/// Handle health check command
pub async fn handle_health_command(config: &NetctlConfig) -> Result<(), CoreError> {
    let client = NetlensClient::new(config.clone())?;

    info!("Checking NetLens health at {}", config.endpoint);

    match check_health(&client).await {
        Ok(health) if health.status == "healthy" => {
            println!("{}", "✓ NetLens is healthy".green().bold());
            print_details(&health);
            Ok(())
        }
        Ok(health) => {
            println!("{}", "✗ NetLens is unhealthy".red().bold());
            print_details(&health);
            Err(CoreError::Internal(format!(
                "service reported status '{}'",
                health.status
            )))
        }
        Err(e) => {
            println!("{}", "✗ NetLens health check failed".red().bold());
            println!("Error: {}", e.to_string().red());
            Err(e)
        }
    }
}

fn print_details(health: &HealthStatus) {
    println!("Version: {}", health.version);
    println!(
        "Active network: {}",
        health.active_network.as_deref().unwrap_or("-")
    );
    println!("Timestamp: {}", health.timestamp);
}

/// The health route answers with a [`HealthStatus`] body for both 200 and 503
async fn check_health(client: &NetlensClient) -> Result<HealthStatus, CoreError> {
    let response = client.get(&["health"]).await?;
    if response.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
        return response
            .json::<HealthStatus>()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to parse JSON response: {}", e)));
    }
    client.handle_response(response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn config_with(status: u16, label: &str) -> (MockServer, NetctlConfig) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "status": label,
                "version": "0.1.0",
                "active_network": null,
                "timestamp": "2024-01-01T00:00:00+00:00"
            })))
            .mount(&server)
            .await;
        let config = NetctlConfig {
            endpoint: server.uri(),
            timeout: 5,
            ..Default::default()
        };
        (server, config)
    }

    #[tokio::test]
    async fn test_healthy_service() {
        let (_server, config) = config_with(200, "healthy").await;
        assert!(handle_health_command(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_unhealthy_service() {
        let (_server, config) = config_with(503, "unhealthy").await;
        assert!(handle_health_command(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let config = NetctlConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout: 1,
            ..Default::default()
        };
        assert!(handle_health_command(&config).await.is_err());
    }
}
