//! # graphql-connect core
//!
//! Grafts GraphQL query, live-query, pagination and mutation operations onto
//! a UI component and mirrors the client's results into observable fields.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphql_connect_client::{HttpGraphQLClient, QueryOptions, WatchQueryOptions};
//! use graphql_connect_core::{ComponentHost, Field, connect};
//!
//! struct UserCard;
//!
//! impl ComponentHost for UserCard {
//!     fn disconnected(&self) {}
//!
//!     fn request_update(&self, field: Field) {
//!         println!("re-render, {field} changed");
//!     }
//! }
//!
//! # async fn run() -> graphql_connect_client::Result<()> {
//! let connector = connect(HttpGraphQLClient::new("https://api.example.com/graphql")?);
//! let card = connector.apply(UserCard);
//!
//! card.run_query(QueryOptions::new("{ me { name } }")).await;
//! println!("{}", card.data()["me"]["name"]);
//!
//! card.watch_query(WatchQueryOptions::new("{ notifications { id } }"));
//! // ...
//! card.disconnected();
//! # Ok(())
//! # }
//! ```
//!
//! ## Failures
//!
//! Operations never return errors. A failed request clears `loading` and
//! goes to the connector's [`ErrorReporter`]:
//!
//! ```
//! use graphql_connect_client::{GraphQLError, QueryOptions};
//! use graphql_connect_core::connect;
//! use graphql_connect_testing::{MockClient, MockHost, RecordingReporter};
//!
//! # tokio_test::block_on(async {
//! let client = MockClient::new();
//! client.push_query(Err(GraphQLError::Timeout));
//!
//! let reporter = RecordingReporter::new();
//! let card = connect(client)
//!     .with_reporter(reporter.clone())
//!     .apply(MockHost::new());
//!
//! card.run_query(QueryOptions::new("{ me { name } }")).await;
//!
//! assert!(!card.loading());
//! assert_eq!(reporter.errors(), vec!["Request timed out".to_string()]);
//! # });
//! ```

mod component;
mod fields;
mod host;
mod report;

pub use component::{Connector, QueryableComponent, connect};
pub use fields::{ComponentFields, Field, FieldListener, FieldSnapshot, ListenerId};
pub use host::ComponentHost;
pub use report::{ErrorReporter, TracingReporter};
