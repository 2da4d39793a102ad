//! The capability set a GraphQL client offers to components.
//!
//! A component only talks to the client through these traits, so it can run
//! against [`HttpGraphQLClient`](crate::HttpGraphQLClient), a mock, or any
//! other implementation.

use async_trait::async_trait;
use std::fmt;

use crate::{
    FetchMoreOptions, FetchResult, GraphQLError, MutationOptions, QueryOptions, QueryResult,
    Result, WatchQueryOptions,
};

/// A GraphQL client.
#[async_trait]
pub trait GraphQLClient: Send + Sync + 'static {
    /// Live handle produced by [`watch_query`](Self::watch_query).
    type LiveQuery: LiveQuery;

    /// Run a query once.
    async fn query(&self, options: QueryOptions) -> Result<QueryResult>;

    /// Create a live handle for a query. Nothing is fetched until the
    /// handle gets a subscriber.
    fn watch_query(&self, options: WatchQueryOptions) -> Self::LiveQuery;

    /// Run a mutation.
    async fn mutate(&self, options: MutationOptions) -> Result<FetchResult>;
}

/// A continuously-updating query.
pub trait LiveQuery: Send + Sync + 'static {
    /// Registration returned by [`subscribe`](Self::subscribe).
    type Subscription: SubscriptionHandle;

    /// Register an observer for results and errors.
    fn subscribe(&self, observer: Observer) -> Self::Subscription;

    /// Fetch another page. The merged result is delivered to subscribers.
    fn fetch_more(&self, options: FetchMoreOptions);
}

/// A cancellable registration on a [`LiveQuery`].
pub trait SubscriptionHandle: Send + Sync + 'static {
    /// Stop receiving notifications. Calling this more than once is a no-op.
    fn unsubscribe(&self);

    /// Whether [`unsubscribe`](Self::unsubscribe) has been called.
    fn is_closed(&self) -> bool;
}

type NextFn = Box<dyn Fn(QueryResult) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&GraphQLError) + Send + Sync>;

/// Callbacks receiving a live query's notifications.
pub struct Observer {
    next: NextFn,
    error: ErrorFn,
}

impl Observer {
    /// Create an observer from a result callback and an error callback.
    pub fn new<N, E>(next: N, error: E) -> Self
    where
        N: Fn(QueryResult) + Send + Sync + 'static,
        E: Fn(&GraphQLError) + Send + Sync + 'static,
    {
        Self {
            next: Box::new(next),
            error: Box::new(error),
        }
    }

    /// Deliver a result.
    pub fn next(&self, result: QueryResult) {
        (self.next)(result)
    }

    /// Deliver an error.
    pub fn error(&self, error: &GraphQLError) {
        (self.error)(error)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}
