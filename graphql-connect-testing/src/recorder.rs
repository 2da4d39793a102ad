// Recording host and reporter

use graphql_connect_client::GraphQLError;
use graphql_connect_core::{ComponentHost, ErrorReporter, Field};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::CallLog;

#[derive(Default)]
struct HostState {
    disconnects: AtomicUsize,
    updates: Mutex<Vec<Field>>,
}

/// [`ComponentHost`] recording teardowns and update requests.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Arc<HostState>,
    log: CallLog,
}

impl MockHost {
    /// Create a host with its own call log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host recording teardowns into `log`
    pub fn with_log(log: CallLog) -> Self {
        Self {
            state: Arc::default(),
            log,
        }
    }

    /// Number of teardowns
    pub fn disconnect_count(&self) -> usize {
        self.state.disconnects.load(Ordering::SeqCst)
    }

    /// Fields whose update was requested, oldest first
    pub fn updates(&self) -> Vec<Field> {
        self.state.updates.lock().clone()
    }

    /// Forget recorded update requests
    pub fn clear_updates(&self) {
        self.state.updates.lock().clear();
    }
}

impl ComponentHost for MockHost {
    fn disconnected(&self) {
        self.log.record("disconnected");
        self.state.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    fn request_update(&self, field: Field) {
        self.state.updates.lock().push(field);
    }
}

#[derive(Default)]
struct ReporterState {
    errors: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

/// [`ErrorReporter`] keeping everything it is given.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    state: Arc<ReporterState>,
}

impl RecordingReporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Reported errors, rendered with `Display`
    pub fn errors(&self) -> Vec<String> {
        self.state.errors.lock().clone()
    }

    /// Emitted warnings
    pub fn warnings(&self) -> Vec<String> {
        self.state.warnings.lock().clone()
    }

    /// Number of reported errors
    pub fn error_count(&self) -> usize {
        self.state.errors.lock().len()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report_error(&self, error: &GraphQLError) {
        self.state.errors.lock().push(error.to_string());
    }

    fn warn(&self, message: &str) {
        self.state.warnings.lock().push(message.to_string());
    }
}
