//! treepir: parallel tree-PIR benchmark
//!
//! Re-exports the workspace crates:
//! - [`treepir_core`]: strategies, partition plans, parameters and configuration
//! - [`treepir_engine`]: the LWE PIR engine and the session traits
//! - [`treepir_bench`]: round timer, workers, round controller and menu

pub use treepir_bench;
pub use treepir_core;
pub use treepir_engine;

pub use treepir_bench::{BenchError, RoundController, RoundReport};
pub use treepir_core::{BenchConfig, PartitionPlan, Strategy};
pub use treepir_engine::{LwePirEngine, PirEngine, PirSession, PlainEngine};
