//! treepir-core: Shared types for the parallel tree-PIR benchmark
//!
//! This crate defines what a benchmark round is made of, independent of the
//! PIR engine and of the thread orchestration:
//! - [`Strategy`]: how retrieval work over the tree is split
//! - [`PartitionPlan`]: per-worker item counts derived from a strategy and a
//!   size exponent
//! - [`PirParams`]: versioned LWE parameters shared by client and server
//! - [`BenchConfig`]: item size, engine parameters and barrier settings
//!
//! # Tree model
//!
//! A database of size exponent `k` has `2^k` leaves. The full binary tree
//! over those leaves has `2^(k+1) - 1` nodes, and layer `i` (counting up from
//! the leaves) holds `2^i` nodes. The three strategies cover that tree in
//! different ways:
//!
//! | Strategy | Workers | Items per worker |
//! |----------|---------|------------------|
//! | Whole tree | k | `2^(k+1) - 1` |
//! | Per layer | k | `2^k, 2^(k-1), ..., 2` |
//! | Balanced partition | k | `ceil((2 * 2^k - 2) / k)` |

mod config;
mod error;
mod params;
mod plan;
mod strategy;

pub use config::{BarrierMode, BenchConfig, HeuristicDelay, CONFIG_VERSION};
pub use error::Error;
pub use params::{ParamsVersionError, PirParams, PIR_PARAMS, PIR_PARAMS_VERSION};
pub use plan::{validate_size_exponent, PartitionPlan};
pub use strategy::Strategy;

pub type Result<T> = std::result::Result<T, Error>;

/// Constants for the benchmark
pub mod constants {
    /// Item size in bytes (one hash value per tree node)
    pub const DEFAULT_ITEM_SIZE: usize = 32;

    /// Largest item the engine packs into one database column group
    pub const MAX_ITEM_SIZE: usize = 4096;

    /// Largest accepted size exponent; keeps `2^(k+1)` inside `u64`
    pub const MAX_SIZE_EXPONENT: u32 = 32;

    /// Heuristic barrier: seconds slept per exponent for per-layer rounds
    pub const PER_LAYER_DELAY_SECS_PER_EXPONENT: u64 = 5;

    /// Heuristic barrier: seconds slept for whole-tree and balanced rounds
    pub const FIXED_DELAY_SECS: u64 = 10;
}
