use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Build the Prometheus recorder and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// Only the first call installs the global recorder; later calls (tests
/// building several apps) get a handle to a detached recorder.
pub fn init_metrics() -> PrometheusHandle {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    if metrics::set_global_recorder(recorder).is_err() {
        tracing::debug!("Prometheus recorder already installed");
    }

    // Pre-register counters so they appear even before the first increment.
    counter!("ledger_buys_total").absolute(0);
    counter!("ledger_sells_total").absolute(0);
    counter!("rate_limited_requests_total").absolute(0);
    for side in ["BUY", "SELL"] {
        counter!("ledger_execution_failures_total", "side" => side).absolute(0);
        histogram!("ledger_execution_latency_seconds", "side" => side).record(0.0);
    }

    handle
}
