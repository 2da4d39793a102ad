//! Where component failures go.

use graphql_connect_client::GraphQLError;
use tracing::{error, warn};

/// Receives failures and precondition warnings from a component.
///
/// Reporting is the only effect a failure has besides clearing the loading
/// flag: nothing is retried and nothing is returned to the caller.
pub trait ErrorReporter: Send + Sync {
    /// A query, live-query notification or mutation failed.
    fn report_error(&self, error: &GraphQLError);

    /// An operation was skipped because a precondition did not hold.
    fn warn(&self, message: &str);
}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report_error(&self, err: &GraphQLError) {
        match err.graphql_errors() {
            Some(errors) => error!(
                error = %err,
                graphql_errors = errors.len(),
                "query error"
            ),
            None => error!(
                error = %err,
                network = err.is_network_error(),
                timeout = err.is_timeout(),
                "query error"
            ),
        }
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}
