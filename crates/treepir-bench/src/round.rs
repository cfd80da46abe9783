//! Benchmark round controller
//!
//! One round plans the partitions, builds a fresh [`RoundTimer`], spawns one
//! scoped OS thread per partition and joins them all. The timer lives on the
//! controller's stack for the duration of the round and is borrowed by every
//! worker, so nothing is shared between rounds.

use std::fmt;
use std::thread;
use std::time::Duration;

use treepir_core::{BenchConfig, PartitionPlan, Strategy};
use treepir_engine::PirEngine;

use crate::error::{BenchError, Result};
use crate::metrics;
use crate::session::{run_session, RetrievalOutcome, WorkerReport, WorkerSpec};
use crate::timer::{RoundTimer, StartBarrier};

/// Runs benchmark rounds against one engine
pub struct RoundController<E> {
    engine: E,
    config: BenchConfig,
}

impl<E: PirEngine> RoundController<E> {
    pub fn new(engine: E, config: BenchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run one round to completion
    ///
    /// The size exponent is validated before any worker exists. When a
    /// worker fails, the remaining workers are still joined and the first
    /// primary failure is returned.
    pub fn run_round(&self, strategy: Strategy, size_exponent: u32) -> Result<RoundReport> {
        let plan = PartitionPlan::new(strategy, size_exponent)?;
        let barrier = StartBarrier::for_round(&self.config, strategy, size_exponent);
        let timer = RoundTimer::new(plan.worker_count(), barrier);
        let item_size = self.config.item_size;

        tracing::info!(
            %strategy,
            size_exponent,
            workers = plan.worker_count(),
            total_items = plan.total_items(),
            engine = self.engine.name(),
            "Starting round"
        );

        let results = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(plan.worker_count());
            let mut results = Vec::with_capacity(plan.worker_count());

            for (worker, &item_count) in plan.item_counts().iter().enumerate() {
                let spec = WorkerSpec {
                    worker,
                    item_count,
                    item_size,
                };
                let (engine, timer) = (&self.engine, &timer);
                let spawned = thread::Builder::new()
                    .name(format!("pir-worker-{worker}"))
                    .spawn_scoped(scope, move || run_session(engine, &spec, timer));

                match spawned {
                    Ok(handle) => handles.push((worker, handle)),
                    Err(e) => {
                        tracing::error!(worker, error = %e, "Failed to spawn worker");
                        timer.abort();
                        results.push(Err(BenchError::Io(e)));
                        break;
                    }
                }
            }

            for (worker, handle) in handles {
                let result = handle
                    .join()
                    .unwrap_or(Err(BenchError::WorkerPanicked(worker)));
                results.push(result);
            }
            results
        });

        self.finish_round(plan, results)
    }

    fn finish_round(
        &self,
        plan: PartitionPlan,
        results: Vec<Result<WorkerReport>>,
    ) -> Result<RoundReport> {
        let strategy = plan.strategy;
        let mut outcomes = Vec::with_capacity(results.len());
        let mut aggregates = Vec::new();
        let mut failure: Option<BenchError> = None;

        for result in results {
            match result {
                Ok(report) => {
                    let outcome = report.outcome;
                    metrics::record_worker_outcome(
                        strategy,
                        outcome.matches,
                        outcome.setup,
                        outcome.retrieval,
                    );
                    aggregates.extend(report.round_elapsed);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    metrics::record_worker_failure(strategy);
                    if e.is_secondary() {
                        tracing::debug!(error = %e, "Worker released by aborted round");
                    } else {
                        tracing::error!(error = %e, "Worker failed");
                    }
                    let replace = match &failure {
                        None => true,
                        Some(current) => current.is_secondary() && !e.is_secondary(),
                    };
                    if replace {
                        failure = Some(e);
                    }
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let elapsed = match aggregates.as_slice() {
            [elapsed] => *elapsed,
            other => return Err(BenchError::AggregateCount(other.len())),
        };

        outcomes.sort_by_key(|o| o.worker);
        metrics::record_round(strategy, plan.size_exponent, plan.worker_count(), elapsed);

        Ok(RoundReport {
            strategy,
            size_exponent: plan.size_exponent,
            plan,
            outcomes,
            elapsed,
        })
    }
}

/// Everything a finished round produced
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub strategy: Strategy,
    pub size_exponent: u32,
    pub plan: PartitionPlan,
    /// One outcome per worker, ordered by worker
    pub outcomes: Vec<RetrievalOutcome>,
    /// From barrier release to the last completion
    pub elapsed: Duration,
}

impl RoundReport {
    pub fn all_match(&self) -> bool {
        self.outcomes.iter().all(|o| o.matches)
    }

    pub fn summary(&self) -> RoundSummary {
        let matched = self.outcomes.iter().filter(|o| o.matches).count();
        RoundSummary {
            strategy: self.strategy,
            size_exponent: self.size_exponent,
            workers: self.outcomes.len(),
            total_items: self.plan.total_items(),
            matched,
            mismatched: self.outcomes.len() - matched,
            elapsed: self.elapsed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub strategy: Strategy,
    pub size_exponent: u32,
    pub workers: usize,
    pub total_items: u64,
    pub matched: usize,
    pub mismatched: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Round: {} (2^{}) ===", self.strategy, self.size_exponent)?;
        writeln!(f, "Workers:      {}", self.workers)?;
        writeln!(f, "Total items:  {}", self.total_items)?;
        writeln!(f, "Matched:      {}", self.matched)?;
        writeln!(f, "Mismatched:   {}", self.mismatched)?;
        write!(f, "Elapsed:      {:.2} ms", self.elapsed.as_secs_f64() * 1000.0)
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.summary(), f)
    }
}
