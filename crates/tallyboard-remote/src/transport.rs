//! GraphQL transport.
//!
//! [`Transport`] is the seam between the board client and the network. The
//! shipped [`HttpTransport`] uses `ureq` (sync) wrapped in
//! `tokio::task::spawn_blocking`; tests substitute an in-memory transport.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};

/// A GraphQL request body: `{"query": ..., "variables": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// Sends one GraphQL request and returns the raw JSON response.
///
/// Implementations fail on transport-level problems only. GraphQL `errors`
/// in a successful response are left for [`extract_data`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &GraphqlRequest, token: &str) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: &GraphqlRequest, token: &str) -> Result<Value> {
        (**self).send(request, token).await
    }
}

/// Pull `data` out of a GraphQL response, failing on a non-empty `errors`
/// array or a top-level `error_message`.
pub fn extract_data(response: Value) -> Result<Value> {
    if let Some(errors) = response.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages = errors
                .iter()
                .map(|e| match e.get("message").and_then(Value::as_str) {
                    Some(message) => message.to_string(),
                    None => e.to_string(),
                })
                .collect();
            return Err(RemoteError::Graphql(messages));
        }
    }

    if let Some(message) = response.get("error_message").and_then(Value::as_str) {
        return Err(RemoteError::Graphql(vec![message.to_string()]));
    }

    match response {
        Value::Object(mut map) => map
            .remove("data")
            .filter(|data| !data.is_null())
            .ok_or_else(|| RemoteError::Decode("response has no data".into())),
        other => Err(RemoteError::Decode(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Transport that POSTs requests to a GraphQL endpoint over HTTPS.
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    api_version: String,
}

impl HttpTransport {
    pub fn new(config: &RemoteConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();

        Self {
            agent,
            endpoint: config.endpoint.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// The endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &GraphqlRequest, token: &str) -> Result<Value> {
        let agent = self.agent.clone();
        let url = self.endpoint.clone();
        let api_version = self.api_version.clone();
        let token = token.to_string();
        let body = request.clone();

        tracing::debug!(endpoint = %url, "sending GraphQL request");

        tokio::task::spawn_blocking(move || {
            let response = agent
                .post(&url)
                .header("Authorization", &token)
                .header("API-Version", &api_version)
                .send_json(&body)
                .map_err(|e| RemoteError::Http(e.to_string()))?;

            let value: Value = response
                .into_body()
                .read_json()
                .map_err(|e| RemoteError::Decode(format!("failed to parse response as JSON: {}", e)))?;

            Ok::<_, RemoteError>(value)
        })
        .await
        .map_err(|e| RemoteError::Join(e.to_string()))?
    }
}
