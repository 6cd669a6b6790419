//! Connection settings for the board service.

use std::time::Duration;

/// Default GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.monday.com/v2";

/// Default value of the `API-Version` header
pub const DEFAULT_API_VERSION: &str = "2024-01";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// GraphQL endpoint URL. Default: monday.com v2 API.
    pub endpoint: String,
    /// API version header value. Default: "2024-01".
    pub api_version: String,
    /// Whole-request timeout. Default: 30 seconds.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RemoteConfig {
    /// Override the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
