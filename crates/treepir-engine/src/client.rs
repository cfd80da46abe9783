//! PIR client: builds queries and decodes replies

use std::sync::Arc;

use rand::{thread_rng, Rng};

use crate::context::EngineContext;
use crate::error::{EngineError, Result};
use crate::lwe::{Matrix, NoiseSampler, SecretKey, Seed, DELTA};
use crate::messages::{EvaluationKey, Hint, Plaintext, Query, Reply};

pub struct PirClient {
    ctx: Arc<EngineContext>,
    secret: SecretKey,
    seed: Seed,
    public: Matrix,
    noise: NoiseSampler,
    hint: Option<Hint>,
}

impl PirClient {
    /// Sample a fresh secret and public matrix for this context
    pub fn new(ctx: Arc<EngineContext>) -> Result<Self> {
        let mut rng = thread_rng();
        let secret = SecretKey::random(ctx.params.lwe_dim, &mut rng);
        let seed: Seed = rng.gen();
        let public = Matrix::expand(seed, ctx.layout.cols, ctx.params.lwe_dim);
        let noise = NoiseSampler::new(ctx.params.noise_sigma)?;

        Ok(Self {
            ctx,
            secret,
            seed,
            public,
            noise,
            hint: None,
        })
    }

    /// Key material the server needs to compute this client's hint
    pub fn evaluation_key(&self) -> EvaluationKey {
        EvaluationKey { seed: self.seed }
    }

    pub fn set_hint(&mut self, hint: Hint) -> Result<()> {
        let rows = self.ctx.layout.rows();
        if hint.0.rows() != rows {
            return Err(EngineError::LengthMismatch {
                what: "hint rows",
                expected: rows,
                actual: hint.0.rows(),
            });
        }
        if hint.0.cols() != self.ctx.params.lwe_dim {
            return Err(EngineError::LengthMismatch {
                what: "hint cols",
                expected: self.ctx.params.lwe_dim,
                actual: hint.0.cols(),
            });
        }
        self.hint = Some(hint);
        Ok(())
    }

    /// Column of the database matrix holding item `index`
    pub fn plaintext_index(&self, index: u64) -> Result<usize> {
        Ok(self.ctx.layout.column(self.check_index(index)?))
    }

    /// Item group of `index` inside its decoded column
    pub fn plaintext_offset(&self, index: u64) -> Result<usize> {
        Ok(self.ctx.layout.group(self.check_index(index)?))
    }

    /// Encrypt the selector of column `plaintext_index`
    pub fn generate_query(&self, plaintext_index: usize) -> Result<Query> {
        let cols = self.ctx.layout.cols;
        if plaintext_index >= cols {
            return Err(EngineError::IndexOutOfRange {
                index: plaintext_index as u64,
                max: cols as u64,
            });
        }

        let mut rng = thread_rng();
        let mut query = self.public.mul_vec(self.secret.as_slice())?;
        for coefficient in query.iter_mut() {
            *coefficient = coefficient.wrapping_add(self.noise.sample(&mut rng));
        }
        query[plaintext_index] = query[plaintext_index].wrapping_add(DELTA);
        Ok(Query(query))
    }

    /// Strip the hint's mask from the reply
    pub fn decode_reply(&self, reply: &Reply) -> Result<Plaintext> {
        let hint = self.hint.as_ref().ok_or(EngineError::MissingHint)?;
        let rows = self.ctx.layout.rows();
        if reply.0.len() != rows {
            return Err(EngineError::LengthMismatch {
                what: "reply",
                expected: rows,
                actual: reply.0.len(),
            });
        }

        let mask = hint.0.mul_vec(self.secret.as_slice())?;
        let coefficients = reply
            .0
            .iter()
            .zip(mask)
            .map(|(&answer, mask)| answer.wrapping_sub(mask))
            .collect();
        Ok(Plaintext(coefficients))
    }

    fn check_index(&self, index: u64) -> Result<usize> {
        let max = self.ctx.layout.item_count as u64;
        if index >= max {
            return Err(EngineError::IndexOutOfRange { index, max });
        }
        Ok(index as usize)
    }
}
