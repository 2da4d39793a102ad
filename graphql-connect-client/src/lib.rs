//! # graphql-connect client
//!
//! The client side of graphql-connect: the capability set components rely on,
//! the operation descriptors they pass in, and an HTTP implementation.
//!
//! ## Features
//!
//! - **Client contract**: [`GraphQLClient`], [`LiveQuery`] and
//!   [`SubscriptionHandle`] traits, implementable by any backend
//! - **Live queries**: watched queries with polling, refetch and pagination
//! - **Error policies**: fail, ignore, or keep GraphQL errors per operation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphql_connect_client::{GraphQLClient, HttpGraphQLClient, QueryOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpGraphQLClient::new("https://api.example.com/graphql")?;
//!
//!     let result = client
//!         .query(
//!             QueryOptions::new("query GetUser($id: ID!) { user(id: $id) { id name } }")
//!                 .variable("id", "123"),
//!         )
//!         .await?;
//!
//!     println!("User: {}", result.data["user"]["name"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Live Queries
//!
//! ```rust,ignore
//! use graphql_connect_client::{
//!     FetchMoreOptions, GraphQLClient, HttpGraphQLClient, LiveQuery, Observer,
//!     SubscriptionHandle, WatchQueryOptions,
//! };
//! use std::time::Duration;
//!
//! let client = HttpGraphQLClient::new("https://api.example.com/graphql")?;
//! let live = client.watch_query(
//!     WatchQueryOptions::new("query Feed($offset: Int) { items }")
//!         .variable("offset", 0)
//!         .poll_interval(Duration::from_secs(30)),
//! );
//!
//! let subscription = live.subscribe(Observer::new(
//!     |result| println!("items: {}", result.data["items"]),
//!     |error| eprintln!("feed failed: {error}"),
//! ));
//!
//! live.fetch_more(FetchMoreOptions::append_list("items").variable("offset", 20));
//! subscription.unsubscribe();
//! ```

mod client;
mod config;
mod contract;
mod error;
mod observable;
mod request;
mod response;

pub use client::HttpGraphQLClient;
pub use config::{
    ENV_ENDPOINT, ENV_TIMEOUT_SECS, ENV_TOKEN, GraphQLClientConfig, GraphQLClientConfigBuilder,
};
pub use contract::{GraphQLClient, LiveQuery, Observer, SubscriptionHandle};
pub use error::{GraphQLError, Result};
pub use observable::{ObservableQuery, ObservableSubscription};
pub use request::{
    ErrorPolicy, FetchMoreOptions, GraphQLRequest, MutationOptions, QueryOptions, UpdateQueryFn,
    WatchQueryOptions,
};
pub use response::{
    ErrorLocation, FetchResult, GraphQLResponse, GraphQLResponseError, NetworkStatus, PathSegment,
    QueryResult, format_path,
};

// Re-export common types
pub use serde_json::Value as JsonValue;
