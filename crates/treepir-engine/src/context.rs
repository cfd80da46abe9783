//! Encryption context: validated parameters plus the database shape both
//! sides of a session agree on

use std::sync::Arc;

use treepir_core::PirParams;

use crate::error::{EngineError, Result};

/// Database arranged as a `groups x cols` grid of items
///
/// Item `i` lives in column `i % cols` of item group `i / cols`. Each item
/// group spans `item_size` matrix rows, one per byte, so the matrix has
/// `groups * item_size` rows and `cols` columns:
///
/// ```text
///          col 0    col 1    col 2
///        ┌────────┬────────┬────────┐
/// group 0│ I0[..] │ I1[..] │ I2[..] │  item_size rows
///        ├────────┼────────┼────────┤
/// group 1│ I3[..] │ I4[..] │ I5[..] │  item_size rows
///        └────────┴────────┴────────┘
/// ```
///
/// A query selects one column; the reply decodes to every item group of that
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseLayout {
    pub item_count: usize,
    pub item_size: usize,
    pub cols: usize,
    pub groups: usize,
}

impl DatabaseLayout {
    pub fn new(item_count: u64, item_size: usize) -> Result<Self> {
        if item_count == 0 {
            return Err(EngineError::EmptyDatabase);
        }
        if item_size == 0 {
            return Err(EngineError::InvalidItemSize(item_size));
        }
        let item_count =
            usize::try_from(item_count).map_err(|_| EngineError::TooLarge { item_count })?;
        item_count
            .checked_mul(item_size)
            .ok_or(EngineError::TooLarge {
                item_count: item_count as u64,
            })?;

        let cols = ceil_sqrt(item_count);
        let groups = item_count.div_ceil(cols);

        Ok(Self {
            item_count,
            item_size,
            cols,
            groups,
        })
    }

    /// Matrix rows: one per byte of every item group
    pub fn rows(&self) -> usize {
        self.groups * self.item_size
    }

    /// Column holding item `index`
    pub fn column(&self, index: usize) -> usize {
        index % self.cols
    }

    /// Item group holding item `index`
    pub fn group(&self, index: usize) -> usize {
        index / self.cols
    }

    pub fn database_bytes(&self) -> usize {
        self.item_count * self.item_size
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root < n {
        root += 1;
    }
    while root > 1 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root.max(1)
}

/// Shared, read-only session context
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub params: PirParams,
    pub layout: DatabaseLayout,
}

/// Validate parameters and size the database matrix for `item_count` items
/// of `item_size` bytes
pub fn build_params(
    params: &PirParams,
    item_count: u64,
    item_size: usize,
) -> Result<Arc<EngineContext>> {
    params.validate()?;
    let layout = DatabaseLayout::new(item_count, item_size)?;

    tracing::debug!(
        item_count,
        item_size,
        cols = layout.cols,
        rows = layout.rows(),
        lwe_dim = params.lwe_dim,
        "Engine context built"
    );

    Ok(Arc::new(EngineContext {
        params: params.clone(),
        layout,
    }))
}
