use opentelemetry::trace::Status;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Run one poll-and-reconcile flight inside a span carrying the job id.
pub(crate) async fn trace_flight<F>(job_id: String, future: F)
where
    F: std::future::Future<Output = ()>,
{
    let span = info_span!("lingo_coordinator.flight");
    span.set_attribute("lingo.job_id", job_id);
    future.instrument(span).await;
}

/// Mark the current span failed with the given message.
pub(crate) fn record_failure(message: &str) {
    let span = Span::current();
    span.set_attribute("exception.message", message.to_string());
    span.set_status(Status::error(message.to_string()));
}
