//! Benchmark error types

use thiserror::Error;
use treepir_engine::EngineError;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Core(#[from] treepir_core::Error),

    #[error("PIR engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Round aborted: another worker failed before the start barrier")]
    RoundAborted,

    #[error("Round timer lock poisoned")]
    TimerPoisoned,

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("Expected exactly one aggregate timing report, got {0}")]
    AggregateCount(usize),

    #[error("Metrics recorder error: {0}")]
    Metrics(String),
}

impl BenchError {
    /// Errors that only echo another worker's failure
    pub fn is_secondary(&self) -> bool {
        matches!(self, BenchError::RoundAborted)
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
