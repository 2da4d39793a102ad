//! Testing utilities for graphql-connect.
//!
//! ## Features
//!
//! - 🎭 **MockClient** - Scripted queries and mutations, hand-driven live queries
//! - 📡 **MockLiveQuery** - Emit results and errors to subscribers on demand
//! - 🔌 **MockSubscription** - Counts release calls
//! - 🖼️ **MockHost** - Records teardowns and update requests
//! - 📝 **RecordingReporter** - Keeps reported errors and warnings
//!
//! ## Quick Start
//!
//! ```
//! use graphql_connect_client::{QueryResult, WatchQueryOptions};
//! use graphql_connect_core::connect;
//! use graphql_connect_testing::*;
//! use serde_json::json;
//!
//! let client = MockClient::new();
//! let reporter = RecordingReporter::new();
//! let component = connect(client.clone())
//!     .with_reporter(reporter.clone())
//!     .apply(MockHost::new());
//!
//! component.watch_query(WatchQueryOptions::new("{ me { name } }"));
//! assert!(component.loading());
//!
//! client
//!     .last_live_query()
//!     .unwrap()
//!     .emit_next(QueryResult::ready(json!({"me": {"name": "Ada"}})));
//!
//! assert!(!component.loading());
//! assert_eq!(component.data()["me"]["name"], "Ada");
//! ```

mod mock;
mod recorder;

pub use mock::{CallLog, MockClient, MockLiveQuery, MockSubscription};
pub use recorder::{MockHost, RecordingReporter};
