//! Live (watched) queries for the HTTP client.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    FetchMoreOptions, GraphQLError, HttpGraphQLClient, LiveQuery, Observer, QueryOptions,
    QueryResult, Result, SubscriptionHandle, WatchQueryOptions,
};

/// A watched query backed by [`HttpGraphQLClient`].
///
/// The first subscriber starts a background task that fetches the query and,
/// when a poll interval is set, keeps refetching it. Results go to every
/// subscriber. Dropping the last subscription stops the task.
#[derive(Clone)]
pub struct ObservableQuery {
    inner: Arc<ObservableInner>,
}

struct ObservableInner {
    client: HttpGraphQLClient,
    options: WatchQueryOptions,
    observers: Mutex<Vec<(u64, Arc<Observer>)>>,
    next_id: AtomicU64,
    last_result: Mutex<Option<QueryResult>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

fn runtime() -> Result<Handle> {
    Handle::try_current()
        .map_err(|_| GraphQLError::Config("watched queries need a tokio runtime".to_string()))
}

/// Overlay `extra` variables on `base`, key by key when both are objects.
fn overlay_variables(base: Option<Value>, extra: Option<Value>) -> Option<Value> {
    match (base, extra) {
        (Some(Value::Object(mut base)), Some(Value::Object(extra))) => {
            base.extend(extra);
            Some(Value::Object(base))
        }
        (base, None) => base,
        (_, extra) => extra,
    }
}

impl ObservableQuery {
    pub(crate) fn new(client: HttpGraphQLClient, options: WatchQueryOptions) -> Self {
        Self {
            inner: Arc::new(ObservableInner {
                client,
                options,
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                last_result: Mutex::new(None),
                poller: Mutex::new(None),
            }),
        }
    }

    /// The watched query's options.
    pub fn options(&self) -> &WatchQueryOptions {
        &self.inner.options
    }

    /// The last result delivered to subscribers.
    pub fn current_result(&self) -> Option<QueryResult> {
        self.inner.last_result.lock().clone()
    }

    /// Number of active subscriptions.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }

    /// Whether the background fetch task is running.
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Fetch the watched query again and deliver the result to subscribers.
    pub fn refetch(&self) {
        let handle = match runtime() {
            Ok(handle) => handle,
            Err(e) => return self.inner.broadcast_error(&e),
        };
        let inner = self.inner.clone();
        handle.spawn(async move {
            let query = inner.options.query.clone();
            inner.fetch_and_broadcast(&query).await;
        });
    }

    fn start(&self) -> Result<()> {
        let handle = runtime()?;
        info!(
            query = %self.inner.options.query.query(),
            poll_interval_ms = self.inner.options.poll_interval.map(|i| i.as_millis() as u64),
            "Starting live query"
        );

        let weak = Arc::downgrade(&self.inner);
        let task = handle.spawn(async move {
            loop {
                let Some(inner) = weak.upgrade() else { break };
                let query = inner.options.query.clone();
                inner.fetch_and_broadcast(&query).await;
                let interval = inner.options.poll_interval;
                drop(inner);

                match interval {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => break,
                }
            }
        });

        if let Some(previous) = self.inner.poller.lock().replace(task) {
            previous.abort();
        }
        Ok(())
    }
}

impl ObservableInner {
    fn broadcast(&self, result: QueryResult) {
        *self.last_result.lock() = Some(result.clone());
        let observers: Vec<_> = self.observers.lock().iter().map(|(_, o)| o.clone()).collect();
        for observer in observers {
            observer.next(result.clone());
        }
    }

    fn broadcast_error(&self, error: &GraphQLError) {
        let observers: Vec<_> = self.observers.lock().iter().map(|(_, o)| o.clone()).collect();
        for observer in observers {
            observer.error(error);
        }
    }

    async fn fetch_and_broadcast(&self, query: &QueryOptions) {
        match self.client.fetch_query(query).await {
            Ok(result) => self.broadcast(result),
            Err(e) => self.broadcast_error(&e),
        }
    }

    fn remove_observer(&self, id: u64) {
        let now_empty = {
            let mut observers = self.observers.lock();
            observers.retain(|(observer_id, _)| *observer_id != id);
            observers.is_empty()
        };

        if now_empty && let Some(task) = self.poller.lock().take() {
            debug!("Last subscriber left, stopping live query");
            task.abort();
        }
    }
}

impl LiveQuery for ObservableQuery {
    type Subscription = ObservableSubscription;

    fn subscribe(&self, observer: Observer) -> ObservableSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let observer = Arc::new(observer);

        let first = {
            let mut observers = self.inner.observers.lock();
            observers.push((id, observer.clone()));
            observers.len() == 1
        };

        if first {
            if let Err(e) = self.start() {
                observer.error(&e);
            }
        } else if let Some(result) = self.current_result() {
            observer.next(result);
        }

        ObservableSubscription {
            id,
            inner: Arc::downgrade(&self.inner),
            closed: AtomicBool::new(false),
        }
    }

    fn fetch_more(&self, options: FetchMoreOptions) {
        let handle = match runtime() {
            Ok(handle) => handle,
            Err(e) => return self.inner.broadcast_error(&e),
        };

        let mut query = self.inner.options.query.clone();
        if let Some(document) = &options.query {
            query.request.query = document.clone();
            query.request.operation_name = None;
        }
        query.request.variables =
            overlay_variables(query.request.variables.take(), options.variables.clone());

        let inner = self.inner.clone();
        handle.spawn(async move {
            match inner.client.fetch_query(&query).await {
                Ok(page) => {
                    let previous = inner
                        .last_result
                        .lock()
                        .as_ref()
                        .map(|r| r.data.clone())
                        .unwrap_or(Value::Null);
                    let data = options.merge(&previous, &page.data);
                    inner.broadcast(QueryResult { data, ..page });
                }
                Err(e) => inner.broadcast_error(&e),
            }
        });
    }
}

/// Subscription on an [`ObservableQuery`].
#[derive(Debug)]
pub struct ObservableSubscription {
    id: u64,
    inner: Weak<ObservableInner>,
    closed: AtomicBool,
}

impl SubscriptionHandle for ObservableSubscription {
    fn unsubscribe(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            inner.remove_observer(self.id);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
