// graphql-connect - GraphQL lifecycle operations for UI components
//
// Wrap any component with a QueryableComponent overlay bound to a shared
// GraphQL client; results are mirrored into observable fields.

// Re-export the overlay
pub use graphql_connect_core::*;

// Re-export the client crate
pub use graphql_connect_client as client;
pub use graphql_connect_client::{
    ErrorPolicy, FetchMoreOptions, FetchResult, GraphQLClient, GraphQLClientConfig, GraphQLError,
    GraphQLResponseError, HttpGraphQLClient, JsonValue, LiveQuery, MutationOptions,
    NetworkStatus, Observer, QueryOptions, QueryResult, SubscriptionHandle, WatchQueryOptions,
};

#[cfg(feature = "testing")]
pub use graphql_connect_testing as testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ComponentFields,
        ComponentHost,
        Connector,
        ErrorPolicy,
        ErrorReporter,
        FetchMoreOptions,
        Field,
        GraphQLClient,
        GraphQLError,
        HttpGraphQLClient,
        MutationOptions,
        NetworkStatus,
        QueryOptions,
        QueryResult,
        QueryableComponent,
        WatchQueryOptions,
        connect,
    };
}
