//! LWE parameter versioning for client/server compatibility
//!
//! Both halves of a PIR session derive the public matrix, the noise
//! distribution and the plaintext scaling from these parameters, so a change
//! to any of them must bump the version.

use serde::{Deserialize, Serialize};

/// PIR parameter version
///
/// Bump this when changing:
/// - the LWE secret dimension
/// - the noise distribution
/// - the plaintext/ciphertext moduli
/// - the public matrix expansion
pub const PIR_PARAMS_VERSION: u16 = 1;

/// Parameters of the LWE-based PIR engine
///
/// The ciphertext modulus is fixed at `2^32` (native `u32` wrapping) and the
/// plaintext modulus at `2^8`, one database byte per matrix entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PirParams {
    /// Parameter version (must match PIR_PARAMS_VERSION)
    pub version: u16,
    /// LWE secret dimension
    pub lwe_dim: usize,
    /// Standard deviation of the rounded Gaussian noise
    pub noise_sigma: f64,
}

impl PirParams {
    /// Small dimension for tests and orchestration dry runs. Not secure.
    pub fn insecure_test() -> Self {
        Self {
            lwe_dim: 64,
            ..PIR_PARAMS
        }
    }

    /// Override the LWE secret dimension
    pub fn with_lwe_dim(mut self, lwe_dim: usize) -> Self {
        self.lwe_dim = lwe_dim;
        self
    }

    /// Check if parameters are compatible with current version
    pub fn is_compatible(&self) -> bool {
        self.version == PIR_PARAMS_VERSION
    }

    /// Validate version and ranges
    pub fn validate(&self) -> Result<(), ParamsVersionError> {
        if self.version != PIR_PARAMS_VERSION {
            return Err(ParamsVersionError::VersionMismatch {
                expected: PIR_PARAMS_VERSION,
                actual: self.version,
            });
        }
        if self.lwe_dim == 0 {
            return Err(ParamsVersionError::OutOfRange("lwe_dim must be positive".into()));
        }
        if !(self.noise_sigma.is_finite() && self.noise_sigma >= 0.0) {
            return Err(ParamsVersionError::OutOfRange(format!(
                "noise_sigma must be finite and non-negative, got {}",
                self.noise_sigma
            )));
        }
        Ok(())
    }
}

impl Default for PirParams {
    fn default() -> Self {
        PIR_PARAMS
    }
}

/// Default parameters (SimplePIR dimension, sigma = 6.4)
pub const PIR_PARAMS: PirParams = PirParams {
    version: PIR_PARAMS_VERSION,
    lwe_dim: 1024,
    noise_sigma: 6.4,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsVersionError {
    #[error("PIR params version mismatch: expected v{expected}, got v{actual}")]
    VersionMismatch { expected: u16, actual: u16 },

    #[error("PIR params out of range: {0}")]
    OutOfRange(String),
}
