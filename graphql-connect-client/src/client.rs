//! HTTP implementation of the client contract.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::request::GraphQLRequest;
use crate::{
    FetchResult, GraphQLClient, GraphQLClientConfig, GraphQLError, GraphQLResponse,
    MutationOptions, ObservableQuery, QueryOptions, QueryResult, Result, WatchQueryOptions,
};

/// GraphQL client speaking JSON over HTTP POST.
#[derive(Clone)]
pub struct HttpGraphQLClient {
    http_client: Client,
    config: Arc<GraphQLClientConfig>,
}

impl HttpGraphQLClient {
    /// Create a new client for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(GraphQLClientConfig::new(endpoint))
    }

    /// Create a new client with custom configuration.
    pub fn with_config(config: GraphQLClientConfig) -> Result<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;

        Ok(Self {
            http_client,
            config: Arc::new(config),
        })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::with_config(GraphQLClientConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GraphQLClientConfig {
        &self.config
    }

    /// Execute a single request.
    pub(crate) async fn execute_request(
        &self,
        request: &GraphQLRequest,
        extra_headers: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<GraphQLResponse<Value>> {
        debug!(
            query = %request.query,
            operation = request.operation_name.as_deref().unwrap_or(""),
            "Executing GraphQL request"
        );

        let mut http_request = self.http_client.post(&self.config.endpoint);

        for (name, value) in &self.config.default_headers {
            http_request = http_request.header(name.as_str(), value.as_str());
        }

        for (name, value) in extra_headers {
            http_request = http_request.header(name.as_str(), value.as_str());
        }

        http_request = http_request.header("Content-Type", "application/json");

        if let Some(timeout) = timeout {
            http_request = http_request.timeout(timeout);
        }

        let response = http_request
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?
            .error_for_status()?;

        let graphql_response: GraphQLResponse<Value> =
            response.json().await.map_err(map_transport_error)?;
        Ok(graphql_response)
    }

    /// Run a query and convert the response into a settled result.
    pub(crate) async fn fetch_query(&self, options: &QueryOptions) -> Result<QueryResult> {
        let response = self
            .execute_request(&options.request, &options.headers, options.timeout)
            .await?
            .apply_error_policy(options.error_policy)?;
        Ok(QueryResult::from_response(response))
    }
}

fn map_transport_error(error: reqwest::Error) -> GraphQLError {
    if error.is_timeout() {
        GraphQLError::Timeout
    } else if error.is_connect() {
        GraphQLError::Connection(error.to_string())
    } else {
        GraphQLError::Http(error)
    }
}

#[async_trait]
impl GraphQLClient for HttpGraphQLClient {
    type LiveQuery = ObservableQuery;

    async fn query(&self, options: QueryOptions) -> Result<QueryResult> {
        self.fetch_query(&options).await
    }

    fn watch_query(&self, mut options: WatchQueryOptions) -> ObservableQuery {
        if options.poll_interval.is_none() {
            options.poll_interval = self.config.default_poll_interval;
        }
        ObservableQuery::new(self.clone(), options)
    }

    async fn mutate(&self, options: MutationOptions) -> Result<FetchResult> {
        self.execute_request(&options.request, &options.headers, options.timeout)
            .await?
            .apply_error_policy(options.error_policy)
    }
}
