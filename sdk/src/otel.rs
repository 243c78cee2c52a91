use opentelemetry::trace::Status;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub(crate) struct ApiSpan {
    span: Span,
}

impl ApiSpan {
    pub(crate) fn new(operation: &'static str, target: &str) -> Self {
        let span = info_span!("lingo_sdk.request");
        span.set_attribute("lingo.operation", operation);
        span.set_attribute("lingo.target", target.to_string());
        Self { span }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub(crate) fn on_error(&self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }
}

/// Run one backend call inside a request span, recording failures on it.
pub(crate) async fn trace_call<F, T, E>(
    operation: &'static str,
    target: &str,
    future: F,
) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let span = ApiSpan::new(operation, target);
    let result = future.instrument(span.span()).await;
    if let Err(error) = &result {
        span.on_error(error);
    }
    result
}
