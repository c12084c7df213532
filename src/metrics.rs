//! Thin wrappers around the `metrics` crate facade (spec's ambient metrics
//! surface, SPEC_FULL §12). The core only ever calls these helpers; wiring
//! an exporter (e.g. `metrics-exporter-prometheus`) is the binary's job, the
//! same split the prior codebase keeps between its ETL core and its server
//! binary's `PrometheusBuilder::install()` call.

use std::time::Duration;

pub fn height_success(analyzer: &str) {
    metrics::counter!("ingest_height_success_total", "analyzer" => analyzer.to_string()).increment(1);
}

pub fn height_failure(analyzer: &str) {
    metrics::counter!("ingest_height_failure_total", "analyzer" => analyzer.to_string()).increment(1);
}

pub fn submit_duration(analyzer: &str, duration: Duration) {
    metrics::histogram!("ingest_submit_duration_seconds", "analyzer" => analyzer.to_string())
        .record(duration.as_secs_f64());
}

pub fn tx_decode_skipped(analyzer: &str) {
    metrics::counter!("ingest_tx_decode_skipped_total", "analyzer" => analyzer.to_string()).increment(1);
}

pub fn backoff_wait(analyzer: &str, duration: Duration) {
    metrics::histogram!("ingest_backoff_wait_seconds", "analyzer" => analyzer.to_string())
        .record(duration.as_secs_f64());
}

pub fn cursor_height(analyzer: &str, height: u64) {
    metrics::gauge!("ingest_cursor_height", "analyzer" => analyzer.to_string()).set(height as f64);
}
