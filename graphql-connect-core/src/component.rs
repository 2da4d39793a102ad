//! The query-bound component overlay.

use graphql_connect_client::{
    FetchMoreOptions, FetchResult, GraphQLClient, GraphQLError, GraphQLResponseError, LiveQuery,
    MutationOptions, NetworkStatus, Observer, QueryOptions, QueryResult, SubscriptionHandle,
    WatchQueryOptions,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

use crate::{ComponentFields, ComponentHost, ErrorReporter, Field, ListenerId, TracingReporter};

type SubscriptionOf<C> = <<C as GraphQLClient>::LiveQuery as LiveQuery>::Subscription;

/// Bind a client; the returned connector turns hosts into
/// [`QueryableComponent`]s that share it.
pub fn connect<C: GraphQLClient>(client: C) -> Connector<C> {
    Connector::new(client)
}

/// Applies the overlay to hosts, all bound to one shared client.
pub struct Connector<C> {
    client: Arc<C>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<C> Clone for Connector<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            reporter: self.reporter.clone(),
        }
    }
}

impl<C: GraphQLClient> Connector<C> {
    /// Create a connector owning `client`.
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    /// Create a connector for an already shared client.
    pub fn from_arc(client: Arc<C>) -> Self {
        Self {
            client,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Send component failures to `reporter` instead of `tracing`.
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// The shared client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Wrap `host` with the overlay.
    pub fn apply<H: ComponentHost>(&self, host: H) -> QueryableComponent<H, C> {
        QueryableComponent {
            shared: Arc::new(Shared {
                host,
                fields: ComponentFields::new(),
                reporter: self.reporter.clone(),
            }),
            client: self.client.clone(),
            last_query: Mutex::new(None),
            last_mutation: Mutex::new(None),
            watch: Mutex::new(None),
            watch_subscription: Mutex::new(None),
        }
    }
}

/// State reachable from live-query callbacks.
struct Shared<H> {
    host: H,
    fields: ComponentFields,
    reporter: Arc<dyn ErrorReporter>,
}

impl<H: ComponentHost> Shared<H> {
    fn changed(&self, field: Field) {
        self.host.request_update(field);
        self.fields.notify(field);
    }

    fn set_loading(&self, loading: bool) {
        self.fields.set_loading(loading);
        self.changed(Field::Loading);
    }

    fn on_success(&self, result: &QueryResult) {
        self.fields.set_data(result.data.clone());
        self.changed(Field::Data);
        self.fields.set_errors(result.errors.clone());
        self.changed(Field::Errors);
        self.fields.set_loading(result.loading);
        self.changed(Field::Loading);
        self.fields.set_network_status(Some(result.network_status));
        self.changed(Field::NetworkStatus);
        self.fields.set_stale(result.stale);
        self.changed(Field::Stale);
    }

    fn on_error(&self, error: &GraphQLError) {
        self.set_loading(false);
        self.reporter.report_error(error);
    }
}

/// A host component with GraphQL lifecycle operations grafted on.
///
/// Results are mirrored into five observable fields (`data`, `errors`,
/// `loading`, `network_status`, `stale`). No operation returns an error:
/// failures clear `loading` and go to the connector's [`ErrorReporter`].
///
/// The component holds at most one live query and one subscription on it.
pub struct QueryableComponent<H, C: GraphQLClient> {
    shared: Arc<Shared<H>>,
    client: Arc<C>,
    last_query: Mutex<Option<QueryResult>>,
    last_mutation: Mutex<Option<FetchResult>>,
    watch: Mutex<Option<Arc<C::LiveQuery>>>,
    watch_subscription: Mutex<Option<SubscriptionOf<C>>>,
}

impl<H: ComponentHost, C: GraphQLClient> QueryableComponent<H, C> {
    /// Run a query once and mirror its result.
    pub async fn run_query(&self, options: QueryOptions) {
        self.shared.set_loading(true);

        match self.client.query(options).await {
            Ok(result) => {
                *self.last_query.lock() = Some(result.clone());
                self.shared.on_success(&result);
            }
            Err(e) => self.shared.on_error(&e),
        }
    }

    /// Start a live query and mirror every result it delivers.
    ///
    /// Returns as soon as the subscription is registered. A previous live
    /// query and its subscription are replaced but NOT released; call
    /// [`disconnected`](Self::disconnected) first to release them.
    pub fn watch_query(&self, options: WatchQueryOptions) {
        self.shared.set_loading(true);

        let live = Arc::new(self.client.watch_query(options));

        let on_next = self.shared.clone();
        let on_error = self.shared.clone();
        let subscription = live.subscribe(Observer::new(
            move |result| on_next.on_success(&result),
            move |error| on_error.on_error(error),
        ));

        *self.watch.lock() = Some(live);
        *self.watch_subscription.lock() = Some(subscription);
    }

    /// Fetch another page of the live query.
    ///
    /// Without a prior [`watch_query`](Self::watch_query) this only emits a
    /// warning. The merged result arrives through the live query's
    /// subscription.
    pub fn fetch_more(&self, options: FetchMoreOptions) {
        // The live query may notify synchronously; listeners can read the component.
        let Some(live) = self.live_query() else {
            self.shared
                .reporter
                .warn("fetch_more() needs an active live query; call watch_query() first");
            return;
        };

        self.shared.set_loading(true);
        live.fetch_more(options);
    }

    /// Run a mutation and keep its raw result.
    ///
    /// A successful mutation leaves every observable field untouched,
    /// `loading` included; only failures are mirrored.
    pub async fn run_mutation(&self, options: MutationOptions) {
        self.shared.set_loading(true);

        match self.client.mutate(options).await {
            Ok(result) => *self.last_mutation.lock() = Some(result),
            Err(e) => self.shared.on_error(&e),
        }
    }

    /// Teardown: release the live-query subscription, then tear down the
    /// host. Safe to call more than once.
    pub fn disconnected(&self) {
        let subscription = self.watch_subscription.lock().take();
        if let Some(subscription) = subscription {
            debug!("Releasing live query subscription");
            subscription.unsubscribe();
        }

        self.shared.host.disconnected();
    }

    /// Register a listener run after every field assignment.
    pub fn observe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Field, &ComponentFields) + Send + Sync + 'static,
    {
        self.shared.fields.listen(Arc::new(listener))
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unobserve(&self, id: ListenerId) -> bool {
        self.shared.fields.unlisten(id)
    }

    pub fn fields(&self) -> &ComponentFields {
        &self.shared.fields
    }

    pub fn data(&self) -> Value {
        self.shared.fields.data()
    }

    /// Deserialize the mirrored data.
    pub fn data_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        self.shared.fields.with_data(|data| T::deserialize(data))
    }

    pub fn errors(&self) -> Option<Vec<GraphQLResponseError>> {
        self.shared.fields.errors()
    }

    pub fn loading(&self) -> bool {
        self.shared.fields.loading()
    }

    pub fn network_status(&self) -> Option<NetworkStatus> {
        self.shared.fields.network_status()
    }

    pub fn stale(&self) -> Option<bool> {
        self.shared.fields.stale()
    }

    /// Raw result of the last successful [`run_query`](Self::run_query).
    pub fn last_query(&self) -> Option<QueryResult> {
        self.last_query.lock().clone()
    }

    /// Raw result of the last successful [`run_mutation`](Self::run_mutation).
    pub fn last_mutation(&self) -> Option<FetchResult> {
        self.last_mutation.lock().clone()
    }

    /// Whether [`watch_query`](Self::watch_query) has created a live query.
    pub fn has_live_query(&self) -> bool {
        self.watch.lock().is_some()
    }

    /// Whether a subscription is held and not yet released.
    pub fn has_subscription(&self) -> bool {
        self.watch_subscription.lock().is_some()
    }

    /// Run `f` against the current live query, if any.
    pub fn with_live_query<R>(&self, f: impl FnOnce(&C::LiveQuery) -> R) -> Option<R> {
        self.live_query().map(|live| f(&live))
    }

    fn live_query(&self) -> Option<Arc<C::LiveQuery>> {
        self.watch.lock().clone()
    }

    pub fn host(&self) -> &H {
        &self.shared.host
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

impl<H, C: GraphQLClient> Deref for QueryableComponent<H, C> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.shared.host
    }
}

/// An overlaid component is itself a host, so overlays can be stacked.
impl<H: ComponentHost, C: GraphQLClient> ComponentHost for QueryableComponent<H, C> {
    fn disconnected(&self) {
        QueryableComponent::disconnected(self)
    }

    fn request_update(&self, field: Field) {
        self.shared.host.request_update(field)
    }
}
