//! Behaviour of the component overlay against mock clients.

use graphql_connect_client::{
    FetchMoreOptions, FetchResult, GraphQLError, GraphQLResponseError, MutationOptions,
    NetworkStatus, QueryOptions, QueryResult, SubscriptionHandle, WatchQueryOptions,
};
use graphql_connect_core::{ComponentFields, ComponentHost, Field, QueryableComponent, connect};
use graphql_connect_testing::{MockClient, MockHost, RecordingReporter};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

struct Fixture {
    client: MockClient,
    host: MockHost,
    reporter: RecordingReporter,
    component: QueryableComponent<MockHost, MockClient>,
}

fn fixture() -> Fixture {
    let client = MockClient::new();
    let host = MockHost::with_log(client.log());
    let reporter = RecordingReporter::new();
    let component = connect(client.clone())
        .with_reporter(reporter.clone())
        .apply(host.clone());
    Fixture {
        client,
        host,
        reporter,
        component,
    }
}

/// Record which fields get assigned.
fn track_changes(component: &QueryableComponent<MockHost, MockClient>) -> Arc<Mutex<Vec<Field>>> {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    component.observe(move |field: Field, _: &ComponentFields| sink.lock().push(field));
    changes
}

fn user_result() -> QueryResult {
    QueryResult {
        data: json!({"id": 1, "name": "A"}),
        errors: None,
        loading: false,
        network_status: NetworkStatus::Ready,
        stale: Some(false),
    }
}

// =============================================================================
// run_query
// =============================================================================

#[tokio::test]
async fn test_run_query_mirrors_result() {
    let f = fixture();
    let result = QueryResult {
        data: json!({"user": {"id": 7}}),
        errors: Some(vec![GraphQLResponseError::new("partial")]),
        loading: false,
        network_status: NetworkStatus::Ready,
        stale: Some(true),
    };
    f.client.push_query(Ok(result.clone()));

    f.component
        .run_query(QueryOptions::new("{ user { id } }"))
        .await;

    assert_eq!(f.component.data(), result.data);
    assert_eq!(f.component.errors(), result.errors);
    assert!(!f.component.loading());
    assert_eq!(f.component.network_status(), Some(NetworkStatus::Ready));
    assert_eq!(f.component.stale(), Some(true));
    assert_eq!(f.component.last_query(), Some(result));
    assert_eq!(f.reporter.error_count(), 0);
}

#[tokio::test]
async fn test_run_query_passes_descriptor_through() {
    let f = fixture();
    f.client.push_query(Ok(user_result()));

    let options = QueryOptions::new("query User($id: ID!) { user(id: $id) { name } }")
        .variable("id", 1)
        .header("X-Tenant", "acme");
    f.component.run_query(options.clone()).await;

    assert_eq!(f.client.query_calls(), vec![options]);
}

#[tokio::test]
async fn test_run_query_sets_loading_before_awaiting() {
    let f = fixture();
    let tx = f.client.defer_query();

    let run = f.component.run_query(QueryOptions::new("{ n }"));
    let check = async {
        tokio::task::yield_now().await;
        assert!(f.component.loading());
        tx.send(Ok(QueryResult::ready(json!({"n": 1})))).unwrap();
    };
    tokio::join!(run, check);

    assert!(!f.component.loading());
    assert_eq!(f.component.data(), json!({"n": 1}));
}

#[tokio::test]
async fn test_run_query_failure_only_clears_loading() {
    let f = fixture();
    f.client.push_query(Ok(user_result()));
    f.component.run_query(QueryOptions::new("{ user }")).await;
    let before = f.component.fields().snapshot();

    f.client.push_query(Err(GraphQLError::Connection("refused".into())));
    let changes = track_changes(&f.component);
    f.component.run_query(QueryOptions::new("{ user }")).await;

    let after = f.component.fields().snapshot();
    assert!(!after.loading);
    assert_eq!(after.data, before.data);
    assert_eq!(after.errors, before.errors);
    assert_eq!(after.network_status, before.network_status);
    assert_eq!(after.stale, before.stale);
    assert_eq!(*changes.lock(), vec![Field::Loading, Field::Loading]);
    assert_eq!(f.reporter.errors(), vec!["Connection error: refused".to_string()]);
}

#[tokio::test]
async fn test_concurrent_queries_last_completion_wins() {
    let f = fixture();
    let first = f.client.defer_query();
    let second = f.client.defer_query();

    let run = async {
        tokio::join!(
            f.component.run_query(QueryOptions::new("{ first }")),
            f.component.run_query(QueryOptions::new("{ second }")),
        )
    };
    let drive = async {
        tokio::task::yield_now().await;
        second.send(Ok(QueryResult::ready(json!({"from": "second"})))).unwrap();
        tokio::task::yield_now().await;
        first.send(Ok(QueryResult::ready(json!({"from": "first"})))).unwrap();
    };
    tokio::join!(run, drive);

    assert_eq!(f.component.data(), json!({"from": "first"}));
}

#[tokio::test]
async fn test_typed_data() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    let f = fixture();
    f.client.push_query(Ok(user_result()));
    f.component.run_query(QueryOptions::new("{ id name }")).await;

    let user: User = f.component.data_as().unwrap();
    assert_eq!(
        user,
        User {
            id: 1,
            name: "A".into()
        }
    );
}

// =============================================================================
// watch_query
// =============================================================================

#[test]
fn test_watch_query_scenario() {
    let f = fixture();

    f.component.watch_query(
        WatchQueryOptions::new("query Q($id: ID!) { node(id: $id) { id name } }")
            .variables(json!({"id": 1})),
    );
    assert!(f.component.loading());

    let live = f.client.last_live_query().unwrap();
    assert_eq!(live.options().query.request.variables, Some(json!({"id": 1})));

    live.emit_next(QueryResult {
        data: json!({"id": 1, "name": "A"}),
        errors: None,
        loading: false,
        network_status: NetworkStatus::from_code(7).unwrap(),
        stale: Some(false),
    });

    assert_eq!(f.component.data(), json!({"id": 1, "name": "A"}));
    assert_eq!(f.component.errors(), None);
    assert!(!f.component.loading());
    assert_eq!(f.component.network_status().map(NetworkStatus::code), Some(7));
    assert_eq!(f.component.stale(), Some(false));
}

#[test]
fn test_watch_query_mirrors_every_notification() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ n }"));
    let live = f.client.last_live_query().unwrap();

    for n in 0..5 {
        live.emit_next(
            QueryResult::ready(json!({"n": n})).with_network_status(NetworkStatus::Poll),
        );
        assert_eq!(f.component.data(), json!({"n": n}));
    }
    assert_eq!(f.component.network_status(), Some(NetworkStatus::Poll));
    assert!(f.component.last_query().is_none());
}

#[test]
fn test_watch_query_error_notification() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ n }"));
    let live = f.client.last_live_query().unwrap();
    live.emit_next(user_result());
    let before = f.component.fields().snapshot();

    f.component.fetch_more(FetchMoreOptions::append_list("items"));
    assert!(f.component.loading());

    live.emit_error(GraphQLError::GraphQL(vec![GraphQLResponseError::new("boom")]));

    let after = f.component.fields().snapshot();
    assert!(!after.loading);
    assert_eq!(after.data, before.data);
    assert_eq!(after.network_status, before.network_status);
    assert_eq!(f.reporter.errors(), vec!["GraphQL errors: boom".to_string()]);
}

#[test]
fn test_watch_query_notifies_host_synchronously() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ n }"));
    assert_eq!(f.host.updates(), vec![Field::Loading]);

    f.host.clear_updates();
    f.client.last_live_query().unwrap().emit_next(user_result());
    assert_eq!(f.host.updates(), Field::ALL.to_vec());
}

#[test]
fn test_listener_reads_fields_during_notification() {
    let f = fixture();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let id = f
        .component
        .observe(move |field: Field, fields: &ComponentFields| {
            if field == Field::Data {
                sink.lock().push(fields.data());
            }
        });

    f.component.watch_query(WatchQueryOptions::new("{ n }"));
    f.client.last_live_query().unwrap().emit_next(user_result());
    assert_eq!(*seen.lock(), vec![json!({"id": 1, "name": "A"})]);

    assert!(f.component.unobserve(id));
    f.client
        .last_live_query()
        .unwrap()
        .emit_next(QueryResult::ready(json!({})));
    assert_eq!(seen.lock().len(), 1);
}

/// Repeated watch_query calls replace the live query without releasing the
/// previous subscription, which keeps delivering.
#[test]
fn test_repeated_watch_query_leaks_previous_subscription() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ a }"));
    f.component.watch_query(WatchQueryOptions::new("{ b }"));

    let lives = f.client.live_queries();
    assert_eq!(lives.len(), 2);
    assert_eq!(lives[0].subscriptions()[0].unsubscribe_calls(), 0);
    assert!(!lives[0].subscriptions()[0].is_closed());

    lives[0].emit_next(QueryResult::ready(json!({"from": "a"})));
    assert_eq!(f.component.data(), json!({"from": "a"}));

    f.component.disconnected();
    assert_eq!(lives[1].subscriptions()[0].unsubscribe_calls(), 1);
    assert_eq!(lives[0].subscriptions()[0].unsubscribe_calls(), 0);
}

// =============================================================================
// fetch_more
// =============================================================================

#[test]
fn test_fetch_more_without_watch_only_warns() {
    let f = fixture();
    let before = f.component.fields().snapshot();
    let changes = track_changes(&f.component);

    f.component.fetch_more(FetchMoreOptions::append_list("items"));

    assert_eq!(f.component.fields().snapshot(), before);
    assert!(changes.lock().is_empty());
    assert!(f.client.log().entries().is_empty());
    assert_eq!(f.reporter.warnings().len(), 1);
    assert!(f.reporter.warnings()[0].contains("watch_query"));
    assert_eq!(f.reporter.error_count(), 0);
}

#[test]
fn test_fetch_more_delegates_descriptor() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ items }"));
    let live = f.client.last_live_query().unwrap();
    live.emit_next(QueryResult::ready(json!({"items": [1]})));
    assert!(!f.component.loading());

    let options = FetchMoreOptions::append_list("items")
        .query("query More($after: Int) { items }")
        .variable("after", 1);
    f.component.fetch_more(options.clone());

    assert!(f.component.loading());
    let calls = live.fetch_more_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, options.query);
    assert_eq!(calls[0].variables, options.variables);
    assert!(Arc::ptr_eq(&calls[0].update_query, &options.update_query));

    // the merged page arrives through the watch subscription
    live.emit_next(QueryResult::ready(json!({"items": [1, 2]})));
    assert!(!f.component.loading());
    assert_eq!(f.component.data(), json!({"items": [1, 2]}));
}

#[test]
fn test_fetch_more_reply_can_reenter_component() {
    let (done_tx, done_rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let client = MockClient::new();
        let component = Arc::new(connect(client.clone()).apply(MockHost::new()));

        let reads = Arc::new(Mutex::new(Vec::new()));
        let weak = Arc::downgrade(&component);
        let sink = reads.clone();
        component.observe(move |field: Field, _: &ComponentFields| {
            if field == Field::Data
                && let Some(component) = weak.upgrade()
            {
                let pages = component.with_live_query(|live| live.fetch_more_calls().len());
                sink.lock().push((component.has_live_query(), pages));
            }
        });

        component.watch_query(WatchQueryOptions::new("{ items }"));
        client
            .last_live_query()
            .unwrap()
            .reply_to_fetch_more(QueryResult::ready(json!({"items": [1, 2]})));
        component.fetch_more(FetchMoreOptions::append_list("items"));

        let _ = done_tx.send((reads.lock().clone(), component.data(), component.loading()));
    });

    let (reads, data, loading) = done_rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("fetch_more blocked a listener reading the component");
    assert_eq!(reads, vec![(true, Some(1))]);
    assert_eq!(data, json!({"items": [1, 2]}));
    assert!(!loading);
}

// =============================================================================
// teardown
// =============================================================================

#[test]
fn test_teardown_releases_subscription_then_host() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ n }"));
    let subscription = f.client.last_live_query().unwrap().subscriptions()[0].clone();

    f.component.disconnected();

    assert_eq!(subscription.unsubscribe_calls(), 1);
    assert!(subscription.is_closed());
    assert_eq!(f.host.disconnect_count(), 1);
    let log = f.client.log().entries();
    assert_eq!(&log[log.len() - 2..], ["unsubscribe", "disconnected"]);
    assert!(!f.component.has_subscription());
    assert!(f.component.has_live_query());
}

#[test]
fn test_teardown_twice_is_safe() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ n }"));
    let subscription = f.client.last_live_query().unwrap().subscriptions()[0].clone();

    f.component.disconnected();
    f.component.disconnected();

    assert_eq!(subscription.unsubscribe_calls(), 1);
    assert_eq!(f.host.disconnect_count(), 2);
}

#[test]
fn test_teardown_without_subscription() {
    let f = fixture();
    f.component.disconnected();

    assert_eq!(f.host.disconnect_count(), 1);
    assert_eq!(f.client.log().entries(), vec!["disconnected".to_string()]);
}

#[test]
fn test_released_subscription_stops_mirroring() {
    let f = fixture();
    f.component.watch_query(WatchQueryOptions::new("{ n }"));
    let live = f.client.last_live_query().unwrap();
    f.component.disconnected();

    live.emit_next(QueryResult::ready(json!({"late": true})));
    assert_eq!(f.component.data(), json!({}));
}

// =============================================================================
// run_mutation
// =============================================================================

#[tokio::test]
async fn test_mutation_success_keeps_fields() {
    let f = fixture();
    f.client.push_query(Ok(user_result()));
    f.component.run_query(QueryOptions::new("{ user }")).await;
    let before = f.component.fields().snapshot();

    f.client
        .push_mutation(Ok(FetchResult::with_data(json!({"ok": true}))));
    f.component
        .run_mutation(MutationOptions::new("mutation M($x: Int) { ok }").variables(json!({"x": 1})))
        .await;

    assert_eq!(
        f.component.last_mutation(),
        Some(FetchResult::with_data(json!({"ok": true})))
    );
    let after = f.component.fields().snapshot();
    assert_eq!(after.data, before.data);
    assert_eq!(after.errors, before.errors);
    assert_eq!(after.network_status, before.network_status);
    assert_eq!(after.stale, before.stale);
    // loading is raised at start and not cleared on success
    assert!(after.loading);
    assert_eq!(
        f.client.mutation_calls()[0].request.variables,
        Some(json!({"x": 1}))
    );
}

#[tokio::test]
async fn test_mutation_failure() {
    let f = fixture();
    let before = f.component.fields().snapshot();
    f.client.push_mutation(Err(GraphQLError::Timeout));

    f.component
        .run_mutation(MutationOptions::new("mutation { ok }"))
        .await;

    assert_eq!(f.component.fields().snapshot(), before);
    assert!(f.component.last_mutation().is_none());
    assert_eq!(f.reporter.errors(), vec!["Request timed out".to_string()]);
}

// =============================================================================
// composition
// =============================================================================

#[tokio::test]
async fn test_components_share_client_but_not_state() {
    let client = MockClient::new();
    let connector = connect(client.clone()).with_reporter(RecordingReporter::new());
    let a = connector.apply(MockHost::new());
    let b = connector.apply(MockHost::new());

    assert!(Arc::ptr_eq(a.client(), b.client()));

    client.push_query(Ok(QueryResult::ready(json!({"who": "a"}))));
    a.run_query(QueryOptions::new("{ who }")).await;
    a.watch_query(WatchQueryOptions::new("{ live }"));

    assert_eq!(b.data(), json!({}));
    assert!(!b.has_live_query());
    b.fetch_more(FetchMoreOptions::append_list("items"));
    assert!(client.last_live_query().unwrap().fetch_more_calls().is_empty());
}

#[test]
fn test_stacked_overlays_tear_down_inner_component() {
    let client = MockClient::new();
    let host = MockHost::with_log(client.log());
    let connector = connect(client.clone()).with_reporter(RecordingReporter::new());

    let inner = connector.apply(host.clone());
    inner.watch_query(WatchQueryOptions::new("{ inner }"));
    let outer = connector.apply(inner);
    outer.watch_query(WatchQueryOptions::new("{ outer }"));

    ComponentHost::disconnected(&outer);

    let lives = client.live_queries();
    assert_eq!(lives[0].subscriptions()[0].unsubscribe_calls(), 1);
    assert_eq!(lives[1].subscriptions()[0].unsubscribe_calls(), 1);
    assert_eq!(host.disconnect_count(), 1);
    assert!(outer.host().has_live_query());
}
