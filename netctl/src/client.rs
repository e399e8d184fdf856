//! HTTP client for the NetLens API

use crate::config::NetctlConfig;
use netlens_core::errors::CoreError;
use netlens_http_bridge::ErrorBody;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// API client for a running NetLens bridge
pub struct NetlensClient {
    client: Client,
    config: NetctlConfig,
}

impl NetlensClient {
    /// Create a new API client
    pub fn new(config: NetctlConfig) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Make a GET request
    pub async fn get(&self, segments: &[&str]) -> Result<Response, CoreError> {
        let url = self.config.api_url(segments)?;
        debug!("GET {}", url);

        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("HTTP GET failed: {}", e)))
    }

    /// Make a POST request with a form-encoded body
    pub async fn post_form(
        &self,
        segments: &[&str],
        form: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = self.config.api_url(segments)?;
        debug!("POST {}", url);

        self.client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("HTTP POST failed: {}", e)))
    }

    /// Check the status of a response and parse its JSON body.
    ///
    /// Failed requests carry an [`ErrorBody`]; its kind is kept in the
    /// message so the user sees e.g. `NoModelLoaded: No network loaded`.
    pub async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T, CoreError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| CoreError::Internal(format!("Failed to parse JSON response: {}", e)));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        error!("API error {}: {}", status, error_text);

        match serde_json::from_str::<ErrorBody>(&error_text) {
            Ok(ErrorBody { kind: Some(kind), message, .. }) => {
                Err(CoreError::Internal(format!("{}: {}", kind, message)))
            }
            Ok(body) => Err(CoreError::Internal(format!("HTTP error {}: {}", status, body.message))),
            Err(_) => match status.as_u16() {
                404 => Err(CoreError::Internal("Resource not found".to_string())),
                500..=599 => Err(CoreError::Internal(format!("Server error: {}", error_text))),
                _ => Err(CoreError::Internal(format!("HTTP error {}: {}", status, error_text))),
            },
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &NetctlConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netlens_http_bridge::ComponentsResponse;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NetlensClient {
        NetlensClient::new(NetctlConfig {
            endpoint: server.uri(),
            timeout: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_components() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_components"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"components": ["Bus", "Generator"]})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.get(&["get_components"]).await.unwrap();
        let body: ComponentsResponse = client.handle_response(response).await.unwrap();
        let names: Vec<&str> = body.components.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["Bus", "Generator"]);
    }

    #[tokio::test]
    async fn test_error_body_keeps_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_components"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "status": "error",
                "kind": "NoModelLoaded",
                "message": "No network loaded"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.get(&["get_components"]).await.unwrap();
        let err = client
            .handle_response::<ComponentsResponse>(response)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Internal error: NoModelLoaded: No network loaded");
    }

    #[tokio::test]
    async fn test_post_form_load_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/load_network"))
            .and(body_string("network=simple.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "network": "simple",
                "snapshots": 3,
                "components": ["Bus"]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .post_form(&["load_network"], &[("network", "simple.json")])
            .await
            .unwrap();
        let body: netlens_http_bridge::LoadNetworkResponse = client.handle_response(response).await.unwrap();
        assert_eq!(body.network, "simple");
        assert_eq!(body.snapshots, 3);
        assert!(body.replaced.is_none());
    }
}
