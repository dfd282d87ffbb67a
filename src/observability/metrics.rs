//! Validation metrics.
//!
//! # Metrics
//! - `request_validation_total` (counter): validation passes by mode, outcome
//! - `request_validation_failures_total` (counter): failing parts by part

use crate::validation::{Mode, RequestPart};

/// Count one validation pass.
pub fn record_outcome(mode: Mode, passed: bool) {
    let outcome = if passed { "passed" } else { "rejected" };
    metrics::counter!(
        "request_validation_total",
        "mode" => mode.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Count one failing request part.
pub fn record_failure(part: RequestPart) {
    metrics::counter!("request_validation_failures_total", "part" => part.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_counters_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_outcome(Mode::Process, false);
            record_failure(RequestPart::Query);
            record_failure(RequestPart::Query);
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"request_validation_total{mode="process",outcome="rejected"} 1"#));
        assert!(rendered.contains(r#"request_validation_failures_total{part="Query"} 2"#));
    }
}
