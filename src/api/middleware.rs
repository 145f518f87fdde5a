// Observability middleware applied outside the security pipeline

use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::TraceLayer,
};

/// Tracing middleware
///
/// Logs method, path, status and latency for every request. Wraps the
/// whole pipeline, so it sees the final rendered status.
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
