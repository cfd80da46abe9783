//! Error types for treepir-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid size exponent: {exponent} (expected 1..={max})")]
    InvalidSizeExponent { exponent: u32, max: u32 },

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown barrier mode: {0}")]
    UnknownBarrierMode(String),

    #[error("Invalid item size: {size} (expected 1..={max})")]
    InvalidItemSize { size: usize, max: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Params(#[from] crate::params::ParamsVersionError),
}
