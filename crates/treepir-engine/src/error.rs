//! Engine error types

use thiserror::Error;
use treepir_core::ParamsVersionError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Params(#[from] ParamsVersionError),

    #[error("Database must hold at least one item")]
    EmptyDatabase,

    #[error("Invalid item size: {0}")]
    InvalidItemSize(usize),

    #[error("Database of {item_count} items does not fit in memory on this platform")]
    TooLarge { item_count: u64 },

    #[error("Database layout mismatch: context has {expected_items} x {expected_size} bytes, got {items} x {size} bytes")]
    LayoutMismatch {
        expected_items: usize,
        expected_size: usize,
        items: u64,
        size: usize,
    },

    #[error("Database size mismatch: expected {expected} bytes, got {actual}")]
    DatabaseSizeMismatch { expected: usize, actual: usize },

    #[error("No database set on server")]
    NoDatabase,

    #[error("Database not preprocessed")]
    NotPreprocessed,

    #[error("No evaluation key registered for client {0}")]
    UnknownClient(u32),

    #[error("Client has not received the server hint")]
    MissingHint,

    #[error("Index out of range: {index} >= {max}")]
    IndexOutOfRange { index: u64, max: u64 },

    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Noise sampler: {0}")]
    Noise(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
