//! GraphQL response and result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ErrorPolicy;

/// Body of a GraphQL-over-HTTP response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GraphQLResponse<T = Value> {
    #[serde(default)]
    pub data: Option<T>,
    /// Errors returned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLResponseError>>,
    /// Server-specific metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// Raw result of a mutation.
pub type FetchResult = GraphQLResponse<Value>;

impl<T> GraphQLResponse<T> {
    /// Create a response carrying only data.
    pub fn with_data(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
            extensions: None,
        }
    }

    /// True when `errors` is present and non-empty.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Server errors, if any.
    pub fn errors(&self) -> Option<&[GraphQLResponseError]> {
        self.errors.as_deref()
    }

    /// Apply an error policy to the response.
    ///
    /// `ErrorPolicy::None` turns a non-empty error list into
    /// [`GraphQLError::GraphQL`](crate::GraphQLError::GraphQL).
    /// `ErrorPolicy::Ignore` discards the error list.
    pub fn apply_error_policy(mut self, policy: ErrorPolicy) -> crate::Result<Self> {
        match policy {
            ErrorPolicy::None => {
                if self.has_errors() {
                    return Err(crate::GraphQLError::GraphQL(
                        self.errors.take().unwrap_or_default(),
                    ));
                }
                self.errors = None;
            }
            ErrorPolicy::Ignore => self.errors = None,
            ErrorPolicy::All => {}
        }
        Ok(self)
    }
}

/// Phase of a query as reported by the client.
///
/// Codes match the ones Apollo-style clients report, so values coming from
/// a JavaScript host or a gateway can be mapped with [`NetworkStatus::from_code`].
/// Serialized as that code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum NetworkStatus {
    /// First request in flight.
    Loading = 1,
    /// Variables changed, request in flight.
    SetVariables = 2,
    /// Pagination request in flight.
    FetchMore = 3,
    /// Refetch in flight.
    Refetch = 4,
    /// Polling request in flight.
    Poll = 6,
    /// No request in flight, data is settled.
    Ready = 7,
    /// Last request failed.
    Error = 8,
}

impl NetworkStatus {
    /// Numeric code of this status.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a numeric code back to a status.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Loading),
            2 => Some(Self::SetVariables),
            3 => Some(Self::FetchMore),
            4 => Some(Self::Refetch),
            6 => Some(Self::Poll),
            7 => Some(Self::Ready),
            8 => Some(Self::Error),
            _ => None,
        }
    }

    /// Whether a request is in flight.
    pub fn is_in_flight(self) -> bool {
        !matches!(self, Self::Ready | Self::Error)
    }
}

impl From<NetworkStatus> for u8 {
    fn from(status: NetworkStatus) -> u8 {
        status.code()
    }
}

impl TryFrom<u8> for NetworkStatus {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, String> {
        Self::from_code(code).ok_or_else(|| format!("unknown network status code {code}"))
    }
}

/// Result of a query, as delivered to `query` callers and live-query observers.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Query payload.
    pub data: Value,
    /// Errors attached to the result (only with `ErrorPolicy::All`).
    pub errors: Option<Vec<GraphQLResponseError>>,
    /// Whether the query is still loading.
    pub loading: bool,
    /// Client-reported phase.
    pub network_status: NetworkStatus,
    /// Whether the client considers the data stale.
    pub stale: Option<bool>,
}

impl QueryResult {
    /// A settled result carrying `data`.
    pub fn ready(data: Value) -> Self {
        Self {
            data,
            errors: None,
            loading: false,
            network_status: NetworkStatus::Ready,
            stale: Some(false),
        }
    }

    /// Set the error list.
    pub fn with_errors(mut self, errors: Vec<GraphQLResponseError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Set the network status.
    pub fn with_network_status(mut self, status: NetworkStatus) -> Self {
        self.network_status = status;
        self
    }

    /// Set the stale flag.
    pub fn with_stale(mut self, stale: Option<bool>) -> Self {
        self.stale = stale;
        self
    }

    /// Build a settled result from a raw response.
    ///
    /// The response is expected to have gone through
    /// [`GraphQLResponse::apply_error_policy`] already.
    pub fn from_response(response: GraphQLResponse<Value>) -> Self {
        Self {
            data: response.data.unwrap_or(Value::Null),
            errors: response.errors,
            loading: false,
            network_status: NetworkStatus::Ready,
            stale: Some(false),
        }
    }
}

/// A GraphQL error from the server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GraphQLResponseError {
    /// Error message.
    pub message: String,
    /// Locations in the query where the error occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    /// Additional error extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLResponseError {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

impl std::fmt::Display for GraphQLResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(locations) = &self.locations
            && !locations.is_empty()
        {
            write!(f, " at ")?;
            for (i, loc) in locations.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}:{}", loc.line, loc.column)?;
            }
        }
        if let Some(path) = &self.path
            && !path.is_empty()
        {
            write!(f, " (path: {})", format_path(path))?;
        }
        Ok(())
    }
}

/// Location in the GraphQL query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// Path segment in a GraphQL error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Field name.
    Field(String),
    /// Array index.
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{}", name),
            Self::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// Format a path as a string.
pub fn format_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
