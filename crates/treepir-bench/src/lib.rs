//! treepir-bench: Parallel tree-PIR benchmark orchestrator
//!
//! Runs one PIR round trip per partition of the tree concurrently and
//! reports how long the slowest one took, measured from the moment every
//! worker finished its setup.

pub mod error;
pub mod menu;
pub mod metrics;
pub mod round;
pub mod session;
pub mod timer;

pub use error::{BenchError, Result};
pub use menu::{
    parse_selector, parse_size_exponent, print_menu, run_menu, MenuChoice, MenuError, MenuStats,
};
pub use round::{RoundController, RoundReport, RoundSummary};
pub use session::{compare, run_session, ByteMismatch, RetrievalOutcome, WorkerReport, WorkerSpec};
pub use timer::{RoundTimer, StartBarrier, TimerSnapshot};
