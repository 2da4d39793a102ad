// Mock client, live query and subscription

use async_trait::async_trait;
use graphql_connect_client::{
    FetchMoreOptions, FetchResult, GraphQLClient, GraphQLError, LiveQuery, MutationOptions,
    Observer, QueryOptions, QueryResult, Result, SubscriptionHandle, WatchQueryOptions,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::oneshot;

/// Shared, ordered log of calls across mocks.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call
    pub fn record(&self, call: &str) {
        self.entries.lock().push(call.to_string());
    }

    /// All recorded calls, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of times `call` was recorded
    pub fn count(&self, call: &str) -> usize {
        self.entries.lock().iter().filter(|c| *c == call).count()
    }

    /// Clear all recorded calls
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

enum Scripted<T> {
    Ready(Result<T>),
    Deferred(oneshot::Receiver<Result<T>>),
}

impl<T> Scripted<T> {
    async fn resolve(self) -> Result<T> {
        match self {
            Scripted::Ready(result) => result,
            Scripted::Deferred(rx) => rx.await.unwrap_or_else(|_| {
                Err(GraphQLError::Connection("deferred response dropped".to_string()))
            }),
        }
    }
}

#[derive(Default)]
struct ClientState {
    queries: Mutex<VecDeque<Scripted<QueryResult>>>,
    mutations: Mutex<VecDeque<Scripted<FetchResult>>>,
    query_calls: Mutex<Vec<QueryOptions>>,
    watch_calls: Mutex<Vec<WatchQueryOptions>>,
    mutation_calls: Mutex<Vec<MutationOptions>>,
    live_queries: Mutex<Vec<MockLiveQuery>>,
}

/// Scriptable [`GraphQLClient`].
///
/// `query` and `mutate` answer from queues filled with `push_*` or
/// `defer_*`; an empty queue answers with a configuration error.
/// `watch_query` hands out [`MockLiveQuery`] handles that tests drive by hand.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<ClientState>,
    log: CallLog,
}

impl MockClient {
    /// Create a mock with empty queues
    pub fn new() -> Self {
        Self::default()
    }

    /// The call log shared with every live query and subscription this mock creates
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Queue the answer to the next `query`
    pub fn push_query(&self, result: Result<QueryResult>) -> &Self {
        self.state.queries.lock().push_back(Scripted::Ready(result));
        self
    }

    /// Queue a `query` answer that is sent later through the returned sender
    pub fn defer_query(&self) -> oneshot::Sender<Result<QueryResult>> {
        let (tx, rx) = oneshot::channel();
        self.state.queries.lock().push_back(Scripted::Deferred(rx));
        tx
    }

    /// Queue the answer to the next `mutate`
    pub fn push_mutation(&self, result: Result<FetchResult>) -> &Self {
        self.state.mutations.lock().push_back(Scripted::Ready(result));
        self
    }

    /// Queue a `mutate` answer that is sent later through the returned sender
    pub fn defer_mutation(&self) -> oneshot::Sender<Result<FetchResult>> {
        let (tx, rx) = oneshot::channel();
        self.state.mutations.lock().push_back(Scripted::Deferred(rx));
        tx
    }

    /// Options passed to every `query` call
    pub fn query_calls(&self) -> Vec<QueryOptions> {
        self.state.query_calls.lock().clone()
    }

    /// Options passed to every `watch_query` call
    pub fn watch_calls(&self) -> Vec<WatchQueryOptions> {
        self.state.watch_calls.lock().clone()
    }

    /// Options passed to every `mutate` call
    pub fn mutation_calls(&self) -> Vec<MutationOptions> {
        self.state.mutation_calls.lock().clone()
    }

    /// Every live query handed out, oldest first
    pub fn live_queries(&self) -> Vec<MockLiveQuery> {
        self.state.live_queries.lock().clone()
    }

    /// The most recent live query
    pub fn last_live_query(&self) -> Option<MockLiveQuery> {
        self.state.live_queries.lock().last().cloned()
    }
}

#[async_trait]
impl GraphQLClient for MockClient {
    type LiveQuery = MockLiveQuery;

    async fn query(&self, options: QueryOptions) -> Result<QueryResult> {
        self.log.record("query");
        self.state.query_calls.lock().push(options);
        let scripted = self.state.queries.lock().pop_front();
        match scripted {
            Some(scripted) => scripted.resolve().await,
            None => Err(GraphQLError::Config("no scripted query response".to_string())),
        }
    }

    fn watch_query(&self, options: WatchQueryOptions) -> MockLiveQuery {
        self.log.record("watch_query");
        self.state.watch_calls.lock().push(options.clone());
        let live = MockLiveQuery::with_log(options, self.log.clone());
        self.state.live_queries.lock().push(live.clone());
        live
    }

    async fn mutate(&self, options: MutationOptions) -> Result<FetchResult> {
        self.log.record("mutate");
        self.state.mutation_calls.lock().push(options);
        let scripted = self.state.mutations.lock().pop_front();
        match scripted {
            Some(scripted) => scripted.resolve().await,
            None => Err(GraphQLError::Config("no scripted mutation response".to_string())),
        }
    }
}

struct LiveState {
    options: WatchQueryOptions,
    observers: Mutex<Vec<(Arc<Observer>, MockSubscription)>>,
    fetch_more_calls: Mutex<Vec<FetchMoreOptions>>,
    fetch_more_replies: Mutex<VecDeque<QueryResult>>,
}

/// Hand-driven [`LiveQuery`].
#[derive(Clone)]
pub struct MockLiveQuery {
    state: Arc<LiveState>,
    log: CallLog,
}

impl MockLiveQuery {
    /// Create a live query with its own call log
    pub fn new(options: WatchQueryOptions) -> Self {
        Self::with_log(options, CallLog::new())
    }

    /// Create a live query recording into `log`
    pub fn with_log(options: WatchQueryOptions, log: CallLog) -> Self {
        Self {
            state: Arc::new(LiveState {
                options,
                observers: Mutex::new(Vec::new()),
                fetch_more_calls: Mutex::new(Vec::new()),
                fetch_more_replies: Mutex::new(VecDeque::new()),
            }),
            log,
        }
    }

    /// Options the live query was created with
    pub fn options(&self) -> &WatchQueryOptions {
        &self.state.options
    }

    fn open_observers(&self) -> Vec<Arc<Observer>> {
        self.state
            .observers
            .lock()
            .iter()
            .filter(|(_, subscription)| !subscription.is_closed())
            .map(|(observer, _)| observer.clone())
            .collect()
    }

    /// Deliver a result to every open subscription
    pub fn emit_next(&self, result: QueryResult) {
        for observer in self.open_observers() {
            observer.next(result.clone());
        }
    }

    /// Deliver an error to every open subscription
    pub fn emit_error(&self, error: GraphQLError) {
        for observer in self.open_observers() {
            observer.error(&error);
        }
    }

    /// Every subscription handed out, open or closed
    pub fn subscriptions(&self) -> Vec<MockSubscription> {
        self.state
            .observers
            .lock()
            .iter()
            .map(|(_, subscription)| subscription.clone())
            .collect()
    }

    /// Number of subscriptions not yet released
    pub fn open_subscriptions(&self) -> usize {
        self.open_observers().len()
    }

    /// Queue a result delivered from inside the next `fetch_more` call,
    /// before it returns
    pub fn reply_to_fetch_more(&self, result: QueryResult) -> &Self {
        self.state.fetch_more_replies.lock().push_back(result);
        self
    }

    /// Options passed to every `fetch_more` call
    pub fn fetch_more_calls(&self) -> Vec<FetchMoreOptions> {
        self.state.fetch_more_calls.lock().clone()
    }
}

impl LiveQuery for MockLiveQuery {
    type Subscription = MockSubscription;

    fn subscribe(&self, observer: Observer) -> MockSubscription {
        self.log.record("subscribe");
        let subscription = MockSubscription::with_log(self.log.clone());
        self.state
            .observers
            .lock()
            .push((Arc::new(observer), subscription.clone()));
        subscription
    }

    fn fetch_more(&self, options: FetchMoreOptions) {
        self.log.record("fetch_more");
        self.state.fetch_more_calls.lock().push(options);
        let reply = self.state.fetch_more_replies.lock().pop_front();
        if let Some(result) = reply {
            self.emit_next(result);
        }
    }
}

#[derive(Default)]
struct SubscriptionState {
    closed: AtomicBool,
    unsubscribe_calls: AtomicUsize,
}

/// [`SubscriptionHandle`] counting its release calls.
#[derive(Clone, Default)]
pub struct MockSubscription {
    state: Arc<SubscriptionState>,
    log: CallLog,
}

impl MockSubscription {
    /// Create an open subscription with its own call log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an open subscription recording into `log`
    pub fn with_log(log: CallLog) -> Self {
        Self {
            state: Arc::default(),
            log,
        }
    }

    /// Number of `unsubscribe` calls, including repeated ones
    pub fn unsubscribe_calls(&self) -> usize {
        self.state.unsubscribe_calls.load(Ordering::SeqCst)
    }
}

impl SubscriptionHandle for MockSubscription {
    fn unsubscribe(&self) {
        self.log.record("unsubscribe");
        self.state.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.state.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}
