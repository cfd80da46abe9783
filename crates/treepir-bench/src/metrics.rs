//! Prometheus metrics for benchmark rounds
//!
//! Labels carry the strategy and outcome only, never item indices.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use treepir_core::Strategy;

use crate::error::{BenchError, Result};

pub const OUTCOME_MATCH: &str = "match";
pub const OUTCOME_MISMATCH: &str = "mismatch";
pub const OUTCOME_ERROR: &str = "error";

pub fn record_round(strategy: Strategy, size_exponent: u32, workers: usize, elapsed: Duration) {
    counter!("treepir_rounds_total", "strategy" => strategy.to_string()).increment(1);
    histogram!("treepir_round_duration_seconds", "strategy" => strategy.to_string())
        .record(elapsed.as_secs_f64());
    gauge!("treepir_round_workers", "strategy" => strategy.to_string()).set(workers as f64);
    gauge!("treepir_round_size_exponent", "strategy" => strategy.to_string())
        .set(size_exponent as f64);
}

pub fn record_worker_outcome(
    strategy: Strategy,
    matches: bool,
    setup: Duration,
    retrieval: Duration,
) {
    let outcome = if matches { OUTCOME_MATCH } else { OUTCOME_MISMATCH };
    counter!(
        "treepir_worker_retrievals_total",
        "strategy" => strategy.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("treepir_worker_setup_seconds", "strategy" => strategy.to_string())
        .record(setup.as_secs_f64());
    histogram!("treepir_worker_retrieval_seconds", "strategy" => strategy.to_string())
        .record(retrieval.as_secs_f64());
}

pub fn record_worker_failure(strategy: Strategy) {
    counter!(
        "treepir_worker_retrievals_total",
        "strategy" => strategy.to_string(),
        "outcome" => OUTCOME_ERROR
    )
    .increment(1);
}

pub fn init_prometheus_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| BenchError::Metrics(e.to_string()))
}
