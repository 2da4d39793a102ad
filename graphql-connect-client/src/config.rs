//! Settings for [`HttpGraphQLClient`](crate::HttpGraphQLClient).

use std::env;
use std::time::Duration;

use crate::{GraphQLError, Result};

/// Environment variable holding the endpoint URL.
pub const ENV_ENDPOINT: &str = "GRAPHQL_CONNECT_ENDPOINT";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "GRAPHQL_CONNECT_TIMEOUT_SECS";
/// Environment variable holding a bearer token.
pub const ENV_TOKEN: &str = "GRAPHQL_CONNECT_TOKEN";

/// Endpoint, transport and live-query settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct GraphQLClientConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Headers sent with every request.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Poll interval for watched queries that don't set their own.
    pub default_poll_interval: Option<Duration>,
}

impl Default for GraphQLClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4000/graphql".to_string(),
            timeout: Duration::from_secs(30),
            default_headers: Vec::new(),
            user_agent: format!("graphql-connect-client/{}", env!("CARGO_PKG_VERSION")),
            default_poll_interval: None,
        }
    }
}

impl GraphQLClientConfig {
    pub fn builder() -> GraphQLClientConfigBuilder {
        GraphQLClientConfigBuilder::default()
    }

    /// Defaults with `endpoint` swapped in.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(endpoint) = env::var(ENV_ENDPOINT) {
            builder = builder.endpoint(endpoint);
        }

        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                GraphQLError::Config(format!("{ENV_TIMEOUT_SECS} must be a number of seconds, got {secs:?}"))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Ok(token) = env::var(ENV_TOKEN) {
            builder = builder.bearer_auth(token);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| GraphQLError::InvalidUrl(format!("{}: {}", self.endpoint, e)))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(GraphQLError::InvalidUrl(format!(
                    "{}: unsupported scheme {other}",
                    self.endpoint
                )));
            }
        }
        if self.timeout.is_zero() {
            return Err(GraphQLError::Config("timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`GraphQLClientConfig`].
#[derive(Debug, Default)]
pub struct GraphQLClientConfigBuilder {
    config: GraphQLClientConfig,
}

impl GraphQLClientConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Per-request timeout unless the descriptor sets its own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Send `name: value` with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .default_headers
            .push((name.into(), value.into()));
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.config.default_headers.push((
            "Authorization".to_string(),
            format!("Bearer {}", token.into()),
        ));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the default poll interval for watched queries.
    pub fn default_poll_interval(mut self, interval: Duration) -> Self {
        self.config.default_poll_interval = Some(interval);
        self
    }

    pub fn build(self) -> GraphQLClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = GraphQLClientConfig::builder()
            .endpoint("https://api.example.com/graphql")
            .timeout(Duration::from_secs(5))
            .bearer_auth("abc")
            .header("X-Trace", "1")
            .default_poll_interval(Duration::from_millis(500))
            .build();

        assert_eq!(config.endpoint, "https://api.example.com/graphql");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.default_headers,
            vec![
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(config.default_poll_interval, Some(Duration::from_millis(500)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoints() {
        assert!(matches!(
            GraphQLClientConfig::new("not a url").validate(),
            Err(GraphQLError::InvalidUrl(_))
        ));
        assert!(matches!(
            GraphQLClientConfig::new("ftp://example.com/graphql").validate(),
            Err(GraphQLError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = GraphQLClientConfig::builder()
            .timeout(Duration::ZERO)
            .build();
        assert!(matches!(config.validate(), Err(GraphQLError::Config(_))));
    }
}
