//! LWE arithmetic over `Z_{2^32}` with plaintext modulus `2^8`

use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{EngineError, Result};

/// Bits of plaintext carried per coefficient
pub const PLAINTEXT_BITS: u32 = 8;

/// Plaintext scaling factor `q / p`
pub const DELTA: u32 = 1 << (32 - PLAINTEXT_BITS);

pub type Seed = <ChaCha12Rng as SeedableRng>::Seed;

/// Dense row-major matrix over `Z_{2^32}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    pub fn from_raw(rows: usize, cols: usize, data: Vec<u32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(EngineError::LengthMismatch {
                what: "matrix",
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Uniform matrix regenerated from a seed
    pub fn expand(seed: Seed, rows: usize, cols: usize) -> Self {
        let mut rng = ChaCha12Rng::from_seed(seed);
        let data = (0..rows * cols).map(|_| rng.next_u32()).collect();
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, r: usize) -> &[u32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn set(&mut self, r: usize, c: usize, value: u32) {
        self.data[r * self.cols + c] = value;
    }

    /// `self * v`
    pub fn mul_vec(&self, v: &[u32]) -> Result<Vec<u32>> {
        if v.len() != self.cols {
            return Err(EngineError::LengthMismatch {
                what: "vector",
                expected: self.cols,
                actual: v.len(),
            });
        }
        Ok((0..self.rows).map(|r| dot(self.row(r), v)).collect())
    }

    /// `self * other`
    pub fn mul_mat(&self, other: &Matrix) -> Result<Matrix> {
        if other.rows != self.cols {
            return Err(EngineError::LengthMismatch {
                what: "matrix inner dimension",
                expected: self.cols,
                actual: other.rows,
            });
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            let out_row = &mut out.data[r * other.cols..(r + 1) * other.cols];
            for (c, &lhs) in self.row(r).iter().enumerate() {
                // Zero bytes contribute nothing.
                if lhs == 0 {
                    continue;
                }
                for (acc, &rhs) in out_row.iter_mut().zip(other.row(c)) {
                    *acc = acc.wrapping_add(lhs.wrapping_mul(rhs));
                }
            }
        }
        Ok(out)
    }
}

pub fn dot(lhs: &[u32], rhs: &[u32]) -> u32 {
    lhs.iter()
        .zip(rhs)
        .fold(0u32, |acc, (&a, &b)| acc.wrapping_add(a.wrapping_mul(b)))
}

/// Uniform LWE secret
#[derive(Clone)]
pub struct SecretKey(Vec<u32>);

impl SecretKey {
    pub fn random<R: Rng + CryptoRng>(dim: usize, rng: &mut R) -> Self {
        Self((0..dim).map(|_| rng.next_u32()).collect())
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey(dim = {})", self.0.len())
    }
}

/// Rounded Gaussian noise, reduced mod `2^32`
pub struct NoiseSampler {
    normal: Option<Normal<f64>>,
}

impl NoiseSampler {
    pub fn new(sigma: f64) -> Result<Self> {
        if sigma == 0.0 {
            return Ok(Self { normal: None });
        }
        let normal = Normal::new(0.0, sigma).map_err(|e| EngineError::Noise(e.to_string()))?;
        Ok(Self {
            normal: Some(normal),
        })
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        match &self.normal {
            Some(normal) => (normal.sample(rng).round() as i64) as u32,
            None => 0,
        }
    }
}

/// Scale a plaintext byte into the top bits of a coefficient
#[cfg(test)]
pub fn encode_plaintext(value: u8) -> u32 {
    u32::from(value).wrapping_mul(DELTA)
}

/// Round a noisy coefficient to the nearest multiple of `DELTA`
pub fn round_to_plaintext(coefficient: u32) -> u8 {
    (coefficient.wrapping_add(DELTA / 2) >> (32 - PLAINTEXT_BITS)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_is_deterministic() {
        let seed = [7u8; 32];
        assert_eq!(Matrix::expand(seed, 3, 5), Matrix::expand(seed, 3, 5));
        assert_ne!(Matrix::expand(seed, 3, 5), Matrix::expand([8u8; 32], 3, 5));
    }

    #[test]
    fn test_mul_vec_wraps() {
        let m = Matrix::from_raw(2, 2, vec![u32::MAX, 2, 3, 4]).unwrap();
        assert_eq!(m.mul_vec(&[2, 1]).unwrap(), vec![0, 10]);
        assert!(m.mul_vec(&[1]).is_err());
    }

    #[test]
    fn test_mul_mat_matches_mul_vec() {
        let a = Matrix::from_raw(2, 3, vec![1, 0, 2, 0, 3, 1]).unwrap();
        let b = Matrix::expand([1u8; 32], 3, 4);
        let product = a.mul_mat(&b).unwrap();
        let v = [5u32, 6, 7, 8];
        let lhs = product.mul_vec(&v).unwrap();
        let rhs = a.mul_vec(&b.mul_vec(&v).unwrap()).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_rounding_tolerates_small_noise() {
        for value in [0u8, 1, 127, 128, 255] {
            let encoded = encode_plaintext(value);
            assert_eq!(round_to_plaintext(encoded), value);
            assert_eq!(
                round_to_plaintext(encoded.wrapping_add(DELTA / 2 - 1)),
                value
            );
            assert_eq!(round_to_plaintext(encoded.wrapping_sub(DELTA / 2)), value);
        }
    }

    #[test]
    fn test_zero_sigma_is_noiseless() {
        let sampler = NoiseSampler::new(0.0).unwrap();
        let mut rng = rand::thread_rng();
        assert!((0..16).all(|_| sampler.sample(&mut rng) == 0));
    }
}
