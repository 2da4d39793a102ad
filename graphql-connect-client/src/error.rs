//! Errors surfaced by GraphQL clients.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphQLError>;

/// Why a query, live query or mutation failed.
///
/// Components never return these; they hand them to an error reporter.
#[derive(Debug, Error)]
pub enum GraphQLError {
    /// Transport failure or non-2xx status from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with `errors` and the error policy was `None`.
    #[error("GraphQL errors: {}", format_errors(.0))]
    GraphQL(Vec<crate::GraphQLResponseError>),

    /// The endpoint could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    /// Endpoint is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Bad settings, a missing runtime, or an unscripted mock call.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn format_errors(errors: &[crate::GraphQLResponseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl GraphQLError {
    /// Whether the request never produced a GraphQL response.
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Connection(_) | Self::Timeout)
    }

    pub fn is_graphql_error(&self) -> bool {
        matches!(self, Self::GraphQL(_))
    }

    /// True for our own timeout and for reqwest's.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Server-side errors carried by a [`GraphQLError::GraphQL`].
    pub fn graphql_errors(&self) -> Option<&[crate::GraphQLResponseError]> {
        match self {
            Self::GraphQL(errors) => Some(errors),
            _ => None,
        }
    }
}
