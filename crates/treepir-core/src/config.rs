//! Benchmark configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ITEM_SIZE, FIXED_DELAY_SECS, MAX_ITEM_SIZE, PER_LAYER_DELAY_SECS_PER_EXPONENT,
};
use crate::{Error, PirParams, Strategy};

/// Configuration format version
pub const CONFIG_VERSION: &str = "1.0.0";

/// How workers are held back until every worker finished its setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierMode {
    /// Count-down latch: the clock starts when the last worker is ready
    #[default]
    Latch,
    /// First arrival sleeps for a fixed delay while holding the timer lock
    Heuristic,
}

impl fmt::Display for BarrierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarrierMode::Latch => write!(f, "latch"),
            BarrierMode::Heuristic => write!(f, "heuristic"),
        }
    }
}

impl FromStr for BarrierMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latch" => Ok(BarrierMode::Latch),
            "heuristic" | "sleep" => Ok(BarrierMode::Heuristic),
            other => Err(Error::UnknownBarrierMode(other.to_string())),
        }
    }
}

/// Sleep durations for [`BarrierMode::Heuristic`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicDelay {
    /// Milliseconds slept per size exponent in per-layer rounds
    #[serde(default = "default_per_layer_ms")]
    pub per_layer_ms_per_exponent: u64,
    /// Milliseconds slept in whole-tree and balanced rounds
    #[serde(default = "default_fixed_ms")]
    pub fixed_ms: u64,
}

fn default_per_layer_ms() -> u64 {
    PER_LAYER_DELAY_SECS_PER_EXPONENT * 1000
}

fn default_fixed_ms() -> u64 {
    FIXED_DELAY_SECS * 1000
}

impl HeuristicDelay {
    /// The same delay regardless of strategy
    pub fn uniform(delay: Duration) -> Self {
        let ms = delay.as_millis() as u64;
        Self {
            per_layer_ms_per_exponent: ms,
            fixed_ms: ms,
        }
    }

    /// Delay expected to cover the slowest worker's setup
    ///
    /// Per-layer rounds scale with the exponent since the largest layer
    /// grows with it; the other strategies use a fixed delay.
    pub fn for_round(&self, strategy: Strategy, size_exponent: u32) -> Duration {
        match strategy {
            Strategy::PerLayer => Duration::from_millis(
                self.per_layer_ms_per_exponent
                    .saturating_mul(u64::from(size_exponent)),
            ),
            Strategy::WholeTree | Strategy::BalancedPartition => {
                Duration::from_millis(self.fixed_ms)
            }
        }
    }
}

impl Default for HeuristicDelay {
    fn default() -> Self {
        Self {
            per_layer_ms_per_exponent: default_per_layer_ms(),
            fixed_ms: default_fixed_ms(),
        }
    }
}

/// Configuration for a benchmark session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Bytes per database item
    #[serde(default = "default_item_size")]
    pub item_size: usize,
    /// Engine parameters shared by every worker
    #[serde(default)]
    pub pir_params: PirParams,
    /// Start barrier used by every round
    #[serde(default)]
    pub barrier: BarrierMode,
    /// Sleep durations when `barrier` is heuristic
    #[serde(default)]
    pub heuristic: HeuristicDelay,
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_item_size() -> usize {
    DEFAULT_ITEM_SIZE
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

impl BenchConfig {
    /// Set the item size
    pub fn with_item_size(mut self, item_size: usize) -> Self {
        self.item_size = item_size;
        self
    }

    /// Set the engine parameters
    pub fn with_pir_params(mut self, params: PirParams) -> Self {
        self.pir_params = params;
        self
    }

    /// Set the barrier mode
    pub fn with_barrier(mut self, barrier: BarrierMode) -> Self {
        self.barrier = barrier;
        self
    }

    /// Set the heuristic sleep durations
    pub fn with_heuristic(mut self, heuristic: HeuristicDelay) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Check ranges before any round is started
    pub fn validate(&self) -> crate::Result<()> {
        if self.item_size == 0 || self.item_size > MAX_ITEM_SIZE {
            return Err(Error::InvalidItemSize {
                size: self.item_size,
                max: MAX_ITEM_SIZE,
            });
        }
        if self.version != CONFIG_VERSION {
            return Err(Error::InvalidConfig(format!(
                "config version {} is not supported (expected {})",
                self.version, CONFIG_VERSION
            )));
        }
        self.pir_params.validate()?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            item_size: DEFAULT_ITEM_SIZE,
            pir_params: PirParams::default(),
            barrier: BarrierMode::default(),
            heuristic: HeuristicDelay::default(),
            version: CONFIG_VERSION.to_string(),
        }
    }
}
