//! Operation descriptors.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// GraphQL request payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    /// The GraphQL query or mutation.
    pub query: String,
    /// Operation name (for documents with multiple operations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Variables for the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl GraphQLRequest {
    /// Create a new request.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: None,
        }
    }
}

/// How GraphQL errors in a response are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Any GraphQL error fails the operation.
    #[default]
    None,
    /// GraphQL errors are dropped; data is returned as-is.
    Ignore,
    /// Data and errors are both returned.
    All,
}

fn to_variables<T: Serialize>(variables: T) -> Value {
    serde_json::to_value(variables).unwrap_or_default()
}

fn insert_variable(slot: &mut Option<Value>, name: String, value: Value) {
    let vars = slot.get_or_insert_with(|| Value::Object(Default::default()));
    if let Value::Object(map) = vars {
        map.insert(name, value);
    }
}

/// Descriptor for a one-shot query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// The request payload.
    pub request: GraphQLRequest,
    /// Error policy.
    pub error_policy: ErrorPolicy,
    /// Per-call timeout, overriding the client default.
    pub timeout: Option<Duration>,
    /// Per-call headers.
    pub headers: Vec<(String, String)>,
}

impl QueryOptions {
    /// Create a descriptor for the given query document.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            request: GraphQLRequest::new(query),
            error_policy: ErrorPolicy::default(),
            timeout: None,
            headers: Vec::new(),
        }
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.request.operation_name = Some(name.into());
        self
    }

    /// Set variables.
    pub fn variables<T: Serialize>(mut self, variables: T) -> Self {
        self.request.variables = Some(to_variables(variables));
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        insert_variable(&mut self.request.variables, name.into(), to_variables(value));
        self
    }

    /// Set the error policy.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header for this request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The query document.
    pub fn query(&self) -> &str {
        &self.request.query
    }
}

/// Descriptor for a live (watched) query.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchQueryOptions {
    /// The underlying query.
    pub query: QueryOptions,
    /// Refetch interval; `None` fetches once.
    pub poll_interval: Option<Duration>,
}

impl WatchQueryOptions {
    /// Create a descriptor for the given query document.
    pub fn new(query: impl Into<String>) -> Self {
        Self::from(QueryOptions::new(query))
    }

    /// Set variables.
    pub fn variables<T: Serialize>(mut self, variables: T) -> Self {
        self.query = self.query.variables(variables);
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        self.query = self.query.variable(name, value);
        self
    }

    /// Set the error policy.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.query = self.query.error_policy(policy);
        self
    }

    /// Poll the query on an interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
}

impl From<QueryOptions> for WatchQueryOptions {
    fn from(query: QueryOptions) -> Self {
        Self {
            query,
            poll_interval: None,
        }
    }
}

/// Merge function combining the previous data with a fetched page.
pub type UpdateQueryFn = Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>;

/// Descriptor for fetching another page of a watched query.
#[derive(Clone)]
pub struct FetchMoreOptions {
    /// Query document to run; `None` reuses the watched query.
    pub query: Option<String>,
    /// Variables overlaid on the watched query's variables.
    pub variables: Option<Value>,
    /// Merges `(previous, fetched)` into the new data.
    pub update_query: UpdateQueryFn,
}

impl FetchMoreOptions {
    /// Create a descriptor with the given merge function.
    pub fn new<F>(update_query: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        Self {
            query: None,
            variables: None,
            update_query: Arc::new(update_query),
        }
    }

    /// Merge by concatenating the top-level array `field` of both pages.
    ///
    /// Other top-level keys take the fetched page's values. A page without
    /// object data (`null` under a lenient error policy) leaves `previous` as is.
    pub fn append_list(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(move |previous, fetched| {
            if !fetched.is_object() {
                return previous.clone();
            }
            let mut merged = fetched.clone();
            let mut items = previous
                .get(&field)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if let Some(more) = fetched.get(&field).and_then(Value::as_array) {
                items.extend(more.iter().cloned());
            }
            if let Value::Object(map) = &mut merged {
                map.insert(field.clone(), Value::Array(items));
            }
            merged
        })
    }

    /// Use a different query document for the page.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set variables.
    pub fn variables<T: Serialize>(mut self, variables: T) -> Self {
        self.variables = Some(to_variables(variables));
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        insert_variable(&mut self.variables, name.into(), to_variables(value));
        self
    }

    /// Run the merge function.
    pub fn merge(&self, previous: &Value, fetched: &Value) -> Value {
        (self.update_query)(previous, fetched)
    }
}

impl fmt::Debug for FetchMoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchMoreOptions")
            .field("query", &self.query)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

/// Descriptor for a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOptions {
    /// The request payload.
    pub request: GraphQLRequest,
    /// Error policy.
    pub error_policy: ErrorPolicy,
    /// Per-call timeout, overriding the client default.
    pub timeout: Option<Duration>,
    /// Per-call headers.
    pub headers: Vec<(String, String)>,
}

impl MutationOptions {
    /// Create a descriptor for the given mutation document.
    pub fn new(mutation: impl Into<String>) -> Self {
        Self {
            request: GraphQLRequest::new(mutation),
            error_policy: ErrorPolicy::default(),
            timeout: None,
            headers: Vec::new(),
        }
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.request.operation_name = Some(name.into());
        self
    }

    /// Set variables.
    pub fn variables<T: Serialize>(mut self, variables: T) -> Self {
        self.request.variables = Some(to_variables(variables));
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        insert_variable(&mut self.request.variables, name.into(), to_variables(value));
        self
    }

    /// Set the error policy.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header for this request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The mutation document.
    pub fn mutation(&self) -> &str {
        &self.request.query
    }
}
