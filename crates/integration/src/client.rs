//! Integration platform client.
//!
//! Wraps the two platform calls the onboarding workflow needs (running an
//! action, reading a data collection) behind the [`IntegrationClient`] trait
//! so the workflow can be driven by a test double.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ConnectorError;

/// Operations exposed by a connector on the integration platform.
#[async_trait]
pub trait IntegrationClient: Send + Sync {
    /// Run a named action against a connection and return its `output`.
    async fn run_action(
        &self,
        connection: &str,
        action: &str,
        input: Value,
    ) -> Result<Value, ConnectorError>;

    /// Read a data collection's specification for the given parameters.
    async fn get_data_collection(
        &self,
        connection: &str,
        collection: &str,
        parameters: Value,
    ) -> Result<Value, ConnectorError>;
}

// ---------------------------------------------------------------------------
// HttpIntegrationClient
// ---------------------------------------------------------------------------

/// HTTP client for the integration platform REST API.
pub struct HttpIntegrationClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl HttpIntegrationClient {
    /// Create a client for the platform at `api_url` authenticating with
    /// a bearer `token`.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, token)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_url,
            token: token.into(),
        }
    }

    // ---- private helpers ----

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.api_url, path));
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    /// Turn a non-2xx response into [`ConnectorError::Api`] and parse the
    /// JSON body of a successful one.
    async fn parse_response(response: reqwest::Response) -> Result<Value, ConnectorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ConnectorError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl IntegrationClient for HttpIntegrationClient {
    async fn run_action(
        &self,
        connection: &str,
        action: &str,
        input: Value,
    ) -> Result<Value, ConnectorError> {
        tracing::debug!(connection, action, "Running connector action");

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/connections/{connection}/actions/{action}/run"),
            )
            .json(&input)
            .send()
            .await?;

        let mut body = Self::parse_response(response).await?;
        Ok(body
            .get_mut("output")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    async fn get_data_collection(
        &self,
        connection: &str,
        collection: &str,
        parameters: Value,
    ) -> Result<Value, ConnectorError> {
        tracing::debug!(connection, collection, "Reading connector data collection");

        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/connections/{connection}/data/{collection}"),
            )
            .query(&[("parameters", parameters.to_string())])
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

/// Pull a human-readable message out of an error body.
///
/// Prefers a JSON `message` (or `error`) string, falling back to the raw
/// body text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
