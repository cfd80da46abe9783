//! PIR server: holds the encoded database and answers queries

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::EngineContext;
use crate::error::{EngineError, Result};
use crate::lwe::Matrix;
use crate::messages::{EvaluationKey, Hint, Query, Reply};

pub struct PirServer {
    ctx: Arc<EngineContext>,
    raw: Option<Vec<u8>>,
    database: Option<Matrix>,
    keys: HashMap<u32, EvaluationKey>,
    hints: HashMap<u32, Hint>,
}

impl PirServer {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self {
            ctx,
            raw: None,
            database: None,
            keys: HashMap::new(),
            hints: HashMap::new(),
        }
    }

    /// Register a client's evaluation key
    ///
    /// If the database is already preprocessed the client's hint is computed
    /// immediately.
    pub fn set_evaluation_key(&mut self, client_id: u32, key: EvaluationKey) -> Result<()> {
        self.keys.insert(client_id, key);
        self.hints.remove(&client_id);
        if let Some(database) = &self.database {
            let hint = compute_hint(database, &self.ctx, &key)?;
            self.hints.insert(client_id, hint);
        }
        Ok(())
    }

    /// Replace the database; it must be preprocessed again before replies
    pub fn set_database(
        &mut self,
        bytes: Vec<u8>,
        item_count: u64,
        item_size: usize,
    ) -> Result<()> {
        let layout = &self.ctx.layout;
        if item_count != layout.item_count as u64 || item_size != layout.item_size {
            return Err(EngineError::LayoutMismatch {
                expected_items: layout.item_count,
                expected_size: layout.item_size,
                items: item_count,
                size: item_size,
            });
        }
        if bytes.len() != layout.database_bytes() {
            return Err(EngineError::DatabaseSizeMismatch {
                expected: layout.database_bytes(),
                actual: bytes.len(),
            });
        }

        self.raw = Some(bytes);
        self.database = None;
        self.hints.clear();
        Ok(())
    }

    /// Encode the database as a matrix and compute a hint per registered key
    pub fn preprocess_database(&mut self) -> Result<()> {
        let raw = self.raw.as_ref().ok_or(EngineError::NoDatabase)?;
        let database = encode_database(raw, &self.ctx);

        self.hints.clear();
        for (&client_id, key) in &self.keys {
            let hint = compute_hint(&database, &self.ctx, key)?;
            self.hints.insert(client_id, hint);
        }

        tracing::debug!(
            rows = database.rows(),
            cols = database.cols(),
            clients = self.keys.len(),
            "Database preprocessed"
        );

        self.database = Some(database);
        Ok(())
    }

    /// Hint for a registered client
    pub fn hint(&self, client_id: u32) -> Result<Hint> {
        if !self.keys.contains_key(&client_id) {
            return Err(EngineError::UnknownClient(client_id));
        }
        self.hints
            .get(&client_id)
            .cloned()
            .ok_or(EngineError::NotPreprocessed)
    }

    /// Multiply the encoded database by the query
    pub fn generate_reply(&self, query: &Query, client_id: u32) -> Result<Reply> {
        if !self.keys.contains_key(&client_id) {
            return Err(EngineError::UnknownClient(client_id));
        }
        let database = self.database.as_ref().ok_or(EngineError::NotPreprocessed)?;
        let answer = database.mul_vec(&query.0).map_err(|_| EngineError::LengthMismatch {
            what: "query",
            expected: database.cols(),
            actual: query.0.len(),
        })?;
        Ok(Reply(answer))
    }

    pub fn is_preprocessed(&self) -> bool {
        self.database.is_some()
    }
}

fn encode_database(raw: &[u8], ctx: &EngineContext) -> Matrix {
    let layout = &ctx.layout;
    let mut matrix = Matrix::zeros(layout.rows(), layout.cols);
    for (index, item) in raw.chunks_exact(layout.item_size).enumerate() {
        let group = layout.group(index);
        let col = layout.column(index);
        for (byte_idx, &byte) in item.iter().enumerate() {
            matrix.set(group * layout.item_size + byte_idx, col, u32::from(byte));
        }
    }
    matrix
}

fn compute_hint(database: &Matrix, ctx: &EngineContext, key: &EvaluationKey) -> Result<Hint> {
    let public = Matrix::expand(key.seed, ctx.layout.cols, ctx.params.lwe_dim);
    Ok(Hint(database.mul_mat(&public)?))
}
