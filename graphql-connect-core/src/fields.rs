//! Observable component fields.
//!
//! A component exposes five fields mirroring the state of its last GraphQL
//! result. Each assignment notifies the host and every registered listener
//! synchronously, after the field's lock has been released, so listeners are
//! free to read any field.

use graphql_connect_client::{GraphQLResponseError, NetworkStatus};
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Names of the observable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Last result payload.
    Data,
    /// Errors attached to the last result.
    Errors,
    /// Whether an operation is in flight.
    Loading,
    /// Client-reported network status.
    NetworkStatus,
    /// Client-reported staleness.
    Stale,
}

impl Field {
    /// All fields, in the order a successful result assigns them.
    pub const ALL: [Field; 5] = [
        Field::Data,
        Field::Errors,
        Field::Loading,
        Field::NetworkStatus,
        Field::Stale,
    ];

    /// Property name as seen by a rendering layer.
    pub fn name(self) -> &'static str {
        match self {
            Field::Data => "data",
            Field::Errors => "errors",
            Field::Loading => "loading",
            Field::NetworkStatus => "networkStatus",
            Field::Stale => "stale",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback run after a field was assigned.
pub type FieldListener = Arc<dyn Fn(Field, &ComponentFields) + Send + Sync>;

/// Point-in-time copy of every field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    pub data: Value,
    pub errors: Option<Vec<GraphQLResponseError>>,
    pub loading: bool,
    pub network_status: Option<NetworkStatus>,
    pub stale: Option<bool>,
}

/// The observable fields of one component.
pub struct ComponentFields {
    data: RwLock<Value>,
    errors: RwLock<Option<Vec<GraphQLResponseError>>>,
    loading: RwLock<bool>,
    network_status: RwLock<Option<NetworkStatus>>,
    stale: RwLock<Option<bool>>,
    listeners: RwLock<Vec<(ListenerId, FieldListener)>>,
    next_listener: AtomicU64,
}

impl Default for ComponentFields {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentFields {
    /// Fields in their initial state: empty object data, not loading,
    /// everything else absent.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Value::Object(Default::default())),
            errors: RwLock::new(None),
            loading: RwLock::new(false),
            network_status: RwLock::new(None),
            stale: RwLock::new(None),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    pub fn data(&self) -> Value {
        self.data.read().clone()
    }

    /// Read the data without cloning it.
    pub fn with_data<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.data.read())
    }

    pub fn errors(&self) -> Option<Vec<GraphQLResponseError>> {
        self.errors.read().clone()
    }

    pub fn loading(&self) -> bool {
        *self.loading.read()
    }

    pub fn network_status(&self) -> Option<NetworkStatus> {
        *self.network_status.read()
    }

    pub fn stale(&self) -> Option<bool> {
        *self.stale.read()
    }

    /// Copy every field.
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            data: self.data(),
            errors: self.errors(),
            loading: self.loading(),
            network_status: self.network_status(),
            stale: self.stale(),
        }
    }

    pub(crate) fn set_data(&self, data: Value) {
        *self.data.write() = data;
    }

    pub(crate) fn set_errors(&self, errors: Option<Vec<GraphQLResponseError>>) {
        *self.errors.write() = errors;
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        *self.loading.write() = loading;
    }

    pub(crate) fn set_network_status(&self, status: Option<NetworkStatus>) {
        *self.network_status.write() = status;
    }

    pub(crate) fn set_stale(&self, stale: Option<bool>) {
        *self.stale.write() = stale;
    }

    pub(crate) fn listen(&self, listener: FieldListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    pub(crate) fn unlisten(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Run every listener for `field`.
    pub(crate) fn notify(&self, field: Field) {
        let listeners: Vec<FieldListener> =
            self.listeners.read().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(field, self);
        }
    }
}

impl fmt::Debug for ComponentFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFields")
            .field("data", &*self.data.read())
            .field("errors", &*self.errors.read())
            .field("loading", &self.loading())
            .field("network_status", &self.network_status())
            .field("stale", &self.stale())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_initial_state() {
        let fields = ComponentFields::new();
        assert_eq!(fields.data(), json!({}));
        assert_eq!(fields.errors(), None);
        assert!(!fields.loading());
        assert_eq!(fields.network_status(), None);
        assert_eq!(fields.stale(), None);
    }

    #[test]
    fn test_listener_sees_assigned_value() {
        let fields = ComponentFields::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        fields.listen(Arc::new(move |field: Field, fields: &ComponentFields| {
            sink.lock().push((field, fields.loading()));
        }));

        fields.set_loading(true);
        fields.notify(Field::Loading);

        assert_eq!(*seen.lock(), vec![(Field::Loading, true)]);
    }

    #[test]
    fn test_unlisten() {
        let fields = ComponentFields::new();
        let count = Arc::new(AtomicU64::new(0));

        let counter = count.clone();
        let id = fields.listen(Arc::new(move |_: Field, _: &ComponentFields| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        fields.notify(Field::Data);
        assert!(fields.unlisten(id));
        assert!(!fields.unlisten(id));
        fields.notify(Field::Data);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_field_names() {
        let names: Vec<_> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["data", "errors", "loading", "networkStatus", "stale"]);
        assert_eq!(Field::NetworkStatus.to_string(), "networkStatus");
    }
}
